use buffer::replacer::ReplacerPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::{num::NonZeroUsize, path::Path};
use thiserror::Error;

/// Name of the database file created inside `data_dir`.
pub const DATABASE_FILE: &str = "strata.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to parse config file {}", .path.display())]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Number of frames in the buffer pool.
    pub buffer_pages: NonZeroUsize,
    #[serde(default)]
    pub replacer: ReplacerPolicy,
    /// Period of the background flush of dirty pages.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_flush_interval_ms() -> u64 {
    1000
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl EngineConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        Self::parse(&text).map_err(|e| match e {
            ConfigError::ParseToml { source, .. } => ConfigError::ParseToml { path, source },
            other => other,
        })
    }

    /// Parses and validates a TOML document.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(text).map_err(|e| ConfigError::ParseToml {
            path: PathBuf::new(),
            source: e,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // buffer_pages is already NonZeroUsize, so "0" can't happen.
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "storage.data_dir must not be empty".to_string(),
            });
        }
        if self.storage.logs_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "storage.logs_dir must not be empty".to_string(),
            });
        }
        if self.storage.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "storage.flush_interval_ms must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
