use crate::error::{Result, ShelfError};
use crate::session::User;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const SESSION_FILENAME: &str = "session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_BACKEND_URL: &str = "SHELF_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "SHELF_ANON_KEY";

/// Configuration for the shelf client, stored in <config dir>/config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Base URL of the hosted backend (e.g. "https://xyz.example.co")
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Public (anonymous) API key sent with every request
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            anon_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ShelfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: ShelfConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Apply `SHELF_BACKEND_URL` / `SHELF_ANON_KEY` on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
            self.backend_url = Some(url);
        }
        if let Ok(key) = std::env::var(ENV_ANON_KEY) {
            self.anon_key = Some(key);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "backend-url" => Some(self.backend_url.clone().unwrap_or_default()),
            "anon-key" => Some(self.anon_key.clone().unwrap_or_default()),
            "timeout" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "backend-url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(format!("backend-url must be an http(s) URL, got {}", value));
                }
                self.backend_url = Some(value.trim_end_matches('/').to_string());
            }
            "anon-key" => self.anon_key = Some(value.to_string()),
            "timeout" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("timeout must be a number of seconds, got {}", value))?;
                if secs == 0 {
                    return Err("timeout must be at least 1 second".to_string());
                }
                self.timeout_secs = secs;
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// The backend URL and key, or a config error naming what is missing.
    pub fn backend_credentials(&self) -> Result<(&str, &str)> {
        let url = self.backend_url.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
            ShelfError::Config("backend-url is not set (shelf config backend-url <url>)".into())
        })?;
        let key = self.anon_key.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
            ShelfError::Config("anon-key is not set (shelf config anon-key <key>)".into())
        })?;
        Ok((url, key))
    }
}

/// The signed-in user and their access token, stored in <config dir>/session.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCache {
    pub access_token: String,
    pub user: User,
}

impl SessionCache {
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Option<Self>> {
        let path = config_dir.as_ref().join(SESSION_FILENAME);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(SESSION_FILENAME), content)?;
        Ok(())
    }

    /// Forget the cached session. Missing file is fine.
    pub fn clear<P: AsRef<Path>>(config_dir: P) -> Result<()> {
        let path = config_dir.as_ref().join(SESSION_FILENAME);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
