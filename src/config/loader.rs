//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, validate_virtual_hosts, ValidationError};
use crate::config::vhost::{parse_virtual_hosts, SyntaxError, VirtualHostConfig};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("syntax error in {}: {source}", .path.display())]
    Syntax { path: PathBuf, source: SyntaxError },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate the settings file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = read(path)?;
    let settings: Settings = toml::from_str(&content)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Load the settings file if one was given, otherwise defaults.
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(Settings::default()),
    }
}

/// Load and validate a virtual-host file.
pub fn load_virtual_hosts(path: &Path) -> Result<Vec<VirtualHostConfig>, ConfigError> {
    let content = read(path)?;
    let hosts = parse_virtual_hosts(&content).map_err(|source| ConfigError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;

    validate_virtual_hosts(&hosts).map_err(ConfigError::Validation)?;

    Ok(hosts)
}
