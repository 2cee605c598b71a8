use anyhow::{Context, Result};
use std::{collections::BTreeMap, fs, path::PathBuf};

use super::registry::{Camera, CameraRegistry};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// JSON file holding `{camera id: adjustment seconds}` pairs.
pub struct CameraStore {
    path: PathBuf,
}

impl CameraStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load saved offsets. A missing file yields an empty registry.
    pub fn load(&self) -> Result<CameraRegistry> {
        let mut registry = CameraRegistry::new();
        if !self.path.exists() {
            log_debug!("no camera file at {}, starting empty", self.path.display());
            return Ok(registry);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cameras from {}", self.path.display()))?;
        let offsets: BTreeMap<String, i64> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cameras in {}", self.path.display()))?;

        for (id, time_adjustment_secs) in offsets {
            registry.insert(Camera {
                id,
                time_adjustment_secs,
            });
        }

        log_info!(
            "loaded {} camera offsets from {}",
            registry.len(),
            self.path.display()
        );
        Ok(registry)
    }

    pub fn save(&self, registry: &CameraRegistry) -> Result<()> {
        let offsets: BTreeMap<&str, i64> = registry
            .cameras()
            .into_iter()
            .map(|camera| (camera.id.as_str(), camera.time_adjustment_secs))
            .collect();
        let serialized = serde_json::to_string_pretty(&offsets)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write cameras to {}", self.path.display()))
    }
}
