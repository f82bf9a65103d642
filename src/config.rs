//! Persisted calibration: the six thresholds plus the knobs around them.
//!
//! Files are pretty-printed JSON:
//!
//! ```json
//! {
//!   "thresholds": { "values": [[112, 132, 114], [211, 156, 133]] },
//!   "settings": { "mixture": { "history": 1, "var_threshold": 75.0, ... }, "open_radius": 0 }
//! }
//! ```

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::ThresholdTable;
use crate::segmentation::background::MixtureConfig;

/// Parameters of a calibration session besides the thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Background model used to mask out non-hand regions
    pub mixture: MixtureConfig,
    /// Opening radius for mask cleanup; 0 disables it
    pub open_radius: u8,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mixture: MixtureConfig::quick_learning(),
            open_radius: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub settings: SessionSettings,
}

impl CalibrationFile {
    pub fn new(thresholds: ThresholdTable, settings: SessionSettings) -> Self {
        Self { thresholds, settings }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid calibration file")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize calibration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file = Self::from_json(&json)?;
        info!("Loaded calibration from {}: {}", path.display(), file.thresholds);
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved calibration to {}", path.display());
        Ok(())
    }

    /// Non-blocking variant of [`CalibrationFile::load`] for the GUI's tasks
    pub async fn load_async(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    pub async fn save_async(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_json()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
