//! Errors raised while reading, writing or validating the CircuitLab
//! configuration file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write the configuration file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The platform has no per-user config directory (`dirs::config_dir`).
    #[error("No config directory on this platform")]
    NoConfigDir,

    /// Creating the config directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot encode config as TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// The file parsed but its values are unusable.
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// A config value the editor cannot work with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Pitch, radii, tolerances, canvas size, zoom limits, history depth and
    /// tick interval must all be positive.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    #[error("view.min_zoom ({min}) must be below view.max_zoom ({max})")]
    ZoomRange { min: f64, max: f64 },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
