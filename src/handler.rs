use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, EditTarget, InputMode, Screen, UploadState};
use crate::models::CHECKLIST_CATEGORIES;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Any keystroke dismisses the last failure notice.
    app.status_message = None;

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.switch_screen(app.screen.next());
            return;
        }
        KeyCode::BackTab => {
            app.switch_screen(app.screen.prev());
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::VisionBoard => handle_vision_board(app, key),
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Checklist => handle_checklist(app, key),
        Screen::Notes => handle_notes(app, key),
    }
}

fn handle_vision_board(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') => app.switch_screen(Screen::Chat),
        KeyCode::Char('l') => app.switch_screen(Screen::Checklist),
        KeyCode::Char('n') => app.switch_screen(Screen::Notes),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.edit_target = EditTarget::ChatInput;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('u') => app.open_upload_prompt(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat_scroll = app.chat_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat_scroll = app.chat_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_checklist(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.checklist_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.checklist_nav_up(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_item(),
        KeyCode::Char('d') => app.delete_selected_item(),
        KeyCode::Char('r') => app.refresh_checklist(),
        // 1-5 select a category filter; the active one clears on re-select.
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            if let Some(category) = CHECKLIST_CATEGORIES.get(idx) {
                app.set_category(category);
            }
        }
        _ => {}
    }
}

fn handle_notes(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.notes_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.notes_nav_up(),
        KeyCode::Char('a') => app.open_note_form(),
        KeyCode::Char('d') => app.delete_selected_note(),
        KeyCode::Char('r') => app.refresh_notes(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.edit_target {
        EditTarget::ChatInput => handle_chat_editing(app, key),
        EditTarget::UploadPath => handle_upload_editing(app, key),
        EditTarget::NoteForm => handle_note_form_editing(app, key),
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    // The input is inert while a request is outstanding.
    if app.chat_loading {
        if key.code == KeyCode::Esc {
            app.input_mode = InputMode::Normal;
        }
        return;
    }
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) => app.chat_input.push(c),
        _ => {}
    }
}

fn handle_upload_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.edit_target = EditTarget::ChatInput;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_upload();
            app.input_mode = InputMode::Normal;
            app.edit_target = EditTarget::ChatInput;
        }
        KeyCode::Backspace => {
            reset_terminal_upload_state(app);
            app.upload_input.pop();
        }
        KeyCode::Char(c) => {
            reset_terminal_upload_state(app);
            app.upload_input.push(c);
        }
        _ => {}
    }
}

/// Entering a new path after a rejection or failure starts the upload
/// lifecycle over.
fn reset_terminal_upload_state(app: &mut App) {
    if matches!(
        app.upload,
        UploadState::Rejected(_) | UploadState::Failed(_) | UploadState::Succeeded(_)
    ) {
        app.upload = UploadState::Idle;
    }
}

fn handle_note_form_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_note_form(),
        KeyCode::Tab => app.note_field = app.note_field.next(),
        KeyCode::Enter => {
            // Enter advances through the fields; from the content field it
            // submits.
            if app.note_field == crate::app::NoteField::Content {
                app.submit_note();
            } else {
                app.note_field = app.note_field.next();
            }
        }
        KeyCode::Backspace => {
            app.note_field_mut().pop();
        }
        KeyCode::Char(c) => app.note_field_mut().push(c),
        _ => {}
    }
}
