use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use rumbo::api::ApiClient;
use rumbo::app::App;
use rumbo::config::Config;
use rumbo::{handler, tui, ui};

/// Log to a file under the config dir; the terminal belongs to the TUI.
fn init_tracing() {
    let Ok(path) = Config::log_path() else { return };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("RUMBO_LOG")
        .unwrap_or_else(|_| EnvFilter::new("rumbo=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let (base_url, api_key) = config.resolve();
    let api = Arc::new(ApiClient::new(&base_url, &api_key));
    let mut app = App::new(api);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }
        app.poll_tasks().await;
    }

    tui::restore()?;
    Ok(())
}
