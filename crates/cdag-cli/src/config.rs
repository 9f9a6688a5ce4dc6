use std::fs;
use std::path::{Path, PathBuf};

use cdag_chunk::ManagerConfig;
use cdag_store::LogConfig;
use serde::{Deserialize, Serialize};

/// Errors loading the CLI configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// CLI configuration, loaded from TOML.
///
/// ```toml
/// data_dir = ".cdag"
///
/// [log]
/// sync_mode = "every_write"
///
/// [manager]
/// max_chunk_size = 1024
/// report_interval_ms = 10000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub log: LogConfig,
    pub manager: ManagerConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".cdag"),
            log: LogConfig::default(),
            manager: ManagerConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manager.max_chunk_size == 0 {
            return Err(ConfigError::Invalid("max_chunk_size must be positive".into()));
        }
        if self.manager.report_interval_ms == 0 {
            return Err(ConfigError::Invalid("report_interval_ms must be positive".into()));
        }
        Ok(())
    }
}
