//! Studio settings persistence
//!
//! Stored in `<config_dir>/studioboard/settings.toml`. Every field has a
//! default, so a missing file is not an error.

use crate::allocation::RolloverScope;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Projected-utilisation thresholds (percent of the monthly allowance)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastThresholds {
    /// At or above this the month will probably fill partially
    pub possible_threshold: f64,
    /// At or above this the month is expected to fill
    pub likely_threshold: f64,
    /// At or above this the month is expected to run over
    pub overbooked_threshold: f64,
}

impl Default for ForecastThresholds {
    fn default() -> Self {
        Self {
            possible_threshold: 75.0,
            likely_threshold: 100.0,
            overbooked_threshold: 110.0,
        }
    }
}

/// studioboard settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    /// Directory holding `clients.json` and `time-entries.json`
    pub data_dir: Option<PathBuf>,

    /// Rollover window (`period` or `month`)
    pub rollover_scope: RolloverScope,

    pub forecast: ForecastThresholds,
}

impl StudioSettings {
    /// `<config_dir>/studioboard/settings.toml`, if a config dir exists on this platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("studioboard").join("settings.toml"))
    }

    /// Load settings, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let settings: Self = toml::from_str(&content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
            source: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Thresholds must be finite, non-negative and ascending
    pub fn validate(&self) -> Result<(), CoreError> {
        let t = &self.forecast;
        let values = [
            t.possible_threshold,
            t.likely_threshold,
            t.overbooked_threshold,
        ];

        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(CoreError::InvalidConfig {
                message: "forecast thresholds must be non-negative numbers".to_string(),
            });
        }

        if !(t.possible_threshold <= t.likely_threshold
            && t.likely_threshold <= t.overbooked_threshold)
        {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "forecast thresholds must be ascending (got {} / {} / {})",
                    t.possible_threshold, t.likely_threshold, t.overbooked_threshold
                ),
            });
        }

        Ok(())
    }
}
