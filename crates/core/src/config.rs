use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::palette::Rgb;

/// Tunables for the sunburst view. Every field has a default, so a config
/// file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Outer ring bound of the visible window, in rings from the centre.
    pub ring_window: u32,
    /// Innermost drawn ring; ring 0 is the focus itself.
    pub inner_ring: u32,
    pub max_pad_angle: f64,
    /// Minimum angular × radial span for a label to be drawn.
    pub label_threshold: f64,
    pub band_inset_px: f64,
    pub transition_ms: u64,
    pub branch_opacity: f32,
    pub leaf_opacity: f32,
    pub palette: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            ring_window: 3,
            inner_ring: 1,
            max_pad_angle: 0.005,
            label_threshold: 0.03,
            band_inset_px: 1.0,
            transition_ms: 750,
            branch_opacity: 0.6,
            leaf_opacity: 0.4,
            palette: [
                "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1",
                "#ff9da7", "#9c755f", "#bab0ab",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ViewConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ViewConfig = serde_json::from_str(s)?;
        cfg.parsed_palette()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn parsed_palette(&self) -> Result<Vec<Rgb>, ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        self.palette
            .iter()
            .map(|s| Rgb::from_hex(s).ok_or_else(|| ConfigError::BadColor(s.clone())))
            .collect()
    }
}
