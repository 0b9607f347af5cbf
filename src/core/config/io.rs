use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::data::{path_display, Config};

const APP_NAME: &str = "ocelot-cli";
const CONFIG_FILENAME: &str = "config.toml";

/// Errors that can occur when loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Loads the file at `config_path`; `Ok(None)` when it does not exist.
    pub fn load_from_path(config_path: &Path) -> Result<Option<Config>, ConfigError> {
        if !config_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    /// `<config dir>/ocelot-cli/config.toml`, or `None` when the platform
    /// has no home directory.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }
}
