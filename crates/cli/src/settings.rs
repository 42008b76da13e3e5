use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use smartad_core::shared::constants::{
    DEFAULT_DETECTION_PROBABILITY, DEFAULT_OVERLAY_DWELL, DEFAULT_SAMPLE_PERIOD,
};

/// Persisted console defaults. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_period_ms: u64,
    pub dwell_ms: u64,
    pub detection_probability: f64,
    /// Seconds between periodic stats lines; 0 disables them.
    pub stats_every: u64,
    pub catalog: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_period_ms: DEFAULT_SAMPLE_PERIOD.as_millis() as u64,
            dwell_ms: DEFAULT_OVERLAY_DWELL.as_millis() as u64,
            detection_probability: DEFAULT_DETECTION_PROBABILITY,
            stats_every: 30,
            catalog: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("SmartAd").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self) -> io::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
