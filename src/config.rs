use crate::richtext::style::DEFAULT_BASE_SIZE;
use crate::richtext::styler::{MatchMode, StylerConfig};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "richmark";
const APPLICATION: &str = "richmark";
const CONFIG_FILE_NAME: &str = "richmark.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("base_size must be greater than zero")]
    InvalidBaseSize,
    #[error("toml serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Settings read from `richmark.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Body text size; headings are encoded relative to it
    pub base_size: u32,
    pub match_mode: MatchMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_size: DEFAULT_BASE_SIZE,
            match_mode: MatchMode::default(),
        }
    }
}

impl Config {
    pub fn styler(&self) -> StylerConfig {
        StylerConfig::new(self.base_size).with_match_mode(self.match_mode)
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if config.base_size == 0 {
        return Err(ConfigError::InvalidBaseSize);
    }
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let toml = toml::to_string_pretty(config)?;
    fs::write(path, toml).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
