use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Rows per file written by `db2json`.
    #[serde(default = "default_rows_max")]
    pub rows_max: usize,

    /// Minimum votes an imported entry needs; 0 imports everything.
    #[serde(default)]
    pub vote_min: i64,
}

fn default_user_agent() -> String {
    format!("link-archive-tools/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_rows_max() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            rows_max: default_rows_max(),
            vote_min: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("link-archive-tools")
            .join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
