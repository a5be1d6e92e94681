use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: None,
            api_key: None,
        }
    }

    /// Load the config file if present; env vars take precedence in
    /// `resolve()`. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Effective (base URL, API key): `RUMBO_API_URL` / `RUMBO_API_KEY`
    /// first, then the config file, then defaults. The key defaults to
    /// empty rather than failing; the server rejects it with a 401 that
    /// surfaces like any other failed request.
    pub fn resolve(&self) -> (String, String) {
        let base_url = std::env::var("RUMBO_API_URL")
            .ok()
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = std::env::var("RUMBO_API_KEY")
            .ok()
            .or_else(|| self.api_key.clone())
            .unwrap_or_default();

        (base_url, api_key)
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rumbo.log"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("rumbo"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env mutations can't race a parallel sibling.
    #[test]
    fn resolve_prefers_env_over_file_over_defaults() {
        std::env::remove_var("RUMBO_API_URL");
        std::env::remove_var("RUMBO_API_KEY");

        let (url, key) = Config::new().resolve();
        assert_eq!(url, DEFAULT_BASE_URL);
        assert_eq!(key, "");

        let config = Config {
            api_base_url: Some("https://api.example.test".to_string()),
            api_key: Some("file-key".to_string()),
        };
        let (url, key) = config.resolve();
        assert_eq!(url, "https://api.example.test");
        assert_eq!(key, "file-key");

        std::env::set_var("RUMBO_API_URL", "https://env.example.test");
        std::env::set_var("RUMBO_API_KEY", "env-key");
        let (url, key) = config.resolve();
        assert_eq!(url, "https://env.example.test");
        assert_eq!(key, "env-key");

        std::env::remove_var("RUMBO_API_URL");
        std::env::remove_var("RUMBO_API_KEY");
    }
}
