use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(alias = "base_url", rename = "baseurl")]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds. Requests never time out when unset.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(alias = "login_format", rename = "loginformat")]
    #[serde(default)]
    pub login_format: LoginFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: None,
            login_format: LoginFormat::default(),
        }
    }
}

/// How credentials are encoded on `POST /auth/login`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginFormat {
    #[default]
    Form,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(alias = "token_file", rename = "tokenfile")]
    #[serde(default)]
    pub token_file: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a valid config.
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout.map(Duration::from_secs)
    }

    /// Location of the persisted token. Falls back to the user's config
    /// directory, then to the working directory.
    pub fn token_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.token_file {
            return expand_home(path);
        }

        match dirs::config_dir() {
            Some(dir) => dir.join("movierec").join("token"),
            None => PathBuf::from(".movierec-token"),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
