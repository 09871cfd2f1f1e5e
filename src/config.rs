use crate::history::DEFAULT_FILE_NAME;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HOME is not set")]
    HomeUnset,
}

/// Startup settings resolved from flags and the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Home directory, target of `cd` and `~`.
    pub home: PathBuf,
    /// History store location.
    pub history_path: PathBuf,
}

impl Config {
    /// Resolve settings from `HOME`, with an optional history file override.
    pub fn from_env(history_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve(env::var_os("HOME"), history_file)
    }

    fn resolve(home: Option<OsString>, history_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let home = home
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::HomeUnset)?;
        let history_path = history_file.unwrap_or_else(|| home.join(DEFAULT_FILE_NAME));
        Ok(Self { home, history_path })
    }
}
