//! Configuration handling for CircuitLab
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default file lives in the platform config
//! directory.
//!
//! Configuration is organized into sections:
//! - Editor settings (grid pitch, hit-testing tolerances, history depth)
//! - View settings (canvas size, zoom limits, wheel sensitivity)
//! - Simulation settings (tick interval, auto-run)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Editor behaviour settings
///
/// Distances are in world units, so hit-testing behaves the same at every
/// zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Grid pitch used for snapping
    pub grid_pitch: f64,
    /// Terminal hit radius
    pub terminal_hit_radius: f64,
    /// Maximum distance from a wire path that still hits the wire
    pub wire_hit_tolerance: f64,
    /// Maximum number of undo steps kept
    pub history_depth: usize,
    /// Suppresses the short-circuit coaching rule
    pub advanced_mode: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_pitch: 20.0,
            terminal_hit_radius: 16.0,
            wire_hit_tolerance: 12.0,
            history_depth: 100,
            advanced_mode: false,
        }
    }
}

/// Canvas view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per unit of wheel delta
    pub wheel_zoom_factor: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            min_zoom: 0.4,
            max_zoom: 2.5,
            wheel_zoom_factor: 0.001,
        }
    }
}

/// Simulation bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Interval between evaluation ticks while running
    pub tick_interval_ms: u64,
    /// Start ticking as soon as the evaluation task is ready
    pub auto_run: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            auto_run: false,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub editor: EditorSettings,
    pub view: ViewSettings,
    pub simulation: SimulationSettings,
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat {
                extension: other.unwrap_or("<none>").to_string(),
            }),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, falling back to defaults when the file does
    /// not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::from_path(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        fn positive(key: &str, value: f64) -> ConfigResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        }

        positive("editor.grid_pitch", self.editor.grid_pitch)?;
        positive("editor.terminal_hit_radius", self.editor.terminal_hit_radius)?;
        positive("editor.wire_hit_tolerance", self.editor.wire_hit_tolerance)?;
        if self.editor.history_depth == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "editor.history_depth".to_string(),
                value: "0".to_string(),
            });
        }

        positive("view.canvas_width", self.view.canvas_width)?;
        positive("view.canvas_height", self.view.canvas_height)?;
        positive("view.min_zoom", self.view.min_zoom)?;
        positive("view.max_zoom", self.view.max_zoom)?;
        positive("view.wheel_zoom_factor", self.view.wheel_zoom_factor)?;
        if self.view.min_zoom >= self.view.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.view.min_zoom,
                max: self.view.max_zoom,
            });
        }

        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "simulation.tick_interval_ms".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

/// Default config file location: `<platform config dir>/circuitlab/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("circuitlab").join("config.toml"))
        .ok_or(SettingsError::NoConfigDir)
}
