//! CircuitLab Settings Crate
//!
//! Handles editor configuration: grid and hit-testing tolerances, view limits,
//! and simulation timing, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, EditorSettings, SimulationSettings, ViewSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
