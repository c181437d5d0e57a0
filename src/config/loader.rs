use crate::config::schema::{Config, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "diag-patcher.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config{} is not valid TOML: {source}", located(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("config{} failed validation: {source}", located(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// The file the error came from, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path.as_path()),
            ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }

    fn at(mut self, file: &Path) -> Self {
        match &mut self {
            ConfigError::Io { path, .. } => *path = file.to_path_buf(),
            ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } => {
                *path = Some(file.to_path_buf())
            }
        }
        self
    }
}

/// Parse and validate config text that did not come from a file.
pub fn load_from_str(input: &str) -> Result<Config, ConfigError> {
    let config: Config = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.at(path))
}

/// Load the explicit config file, else `diag-patcher.toml` in `dir`, else defaults.
pub fn load_or_default(explicit: Option<&Path>, dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let discovered = dir.join(CONFIG_FILE_NAME);
    if discovered.is_file() {
        tracing::debug!(path = %discovered.display(), "using discovered config");
        return load_from_path(discovered);
    }

    Ok(Config::default())
}
