//! Runtime settings.
//!
//! Settings come from built-in defaults, then an optional TOML file, then command-line
//! overrides, in that order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::WriteDurability;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_FILE: &str = "snippets.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid command line: {0}")]
    InvalidFlag(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub durable_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            durable_writes: false,
        }
    }
}

/// Values given on the command line; `None` keeps what the file or defaults say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub durable_writes: bool,
}

impl Config {
    /// `<config dir>/cssnip/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cssnip").join("config.toml"))
    }

    /// Resolves the final settings.
    ///
    /// An explicitly named config file must exist; the default one is optional.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match &overrides.config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(data_file) = &overrides.data_file {
            self.data_file = data_file.clone();
        }
        if let Some(bind) = &overrides.bind {
            self.bind = bind.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if overrides.durable_writes {
            self.durable_writes = true;
        }
    }

    pub fn durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::Fast
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = Config::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert_eq!(config.data_file, PathBuf::from("snippets.json"));
        assert_eq!(config.durability(), WriteDurability::Fast);
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = 8080\ndata_file = \"/srv/css/snippets.json\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.data_file, PathBuf::from("/srv/css/snippets.json"));
    }

    #[test]
    fn overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = 8080\nbind = \"127.0.0.1\"\n").unwrap();

        let overrides = ConfigOverrides {
            config_file: Some(path),
            port: Some(9000),
            durable_writes: true,
            ..ConfigOverrides::default()
        };
        let config = Config::load(&overrides).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
        assert_eq!(config.durability(), WriteDurability::Durable);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            config_file: Some(dir.path().join("absent.toml")),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            Config::load(&overrides),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "prot = 1\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
