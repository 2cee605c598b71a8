use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Key shared by every photo that carries no camera model.
pub const UNKNOWN_CAMERA_ID: &str = "<unknown camera>";

const SECS_PER_HOUR: i64 = 3600;
const SECS_PER_MINUTE: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: String,
    /// Signed clock drift added to every capture time from this camera.
    pub time_adjustment_secs: i64,
}

impl Camera {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time_adjustment_secs: 0,
        }
    }

    /// Fails when the stored seconds exceed what a `Duration` can hold.
    pub fn time_adjustment(&self) -> Result<Duration> {
        Duration::try_seconds(self.time_adjustment_secs).ok_or_else(|| {
            anyhow!(
                "time adjustment of camera {} is out of range: {}s",
                self.id,
                self.time_adjustment_secs
            )
        })
    }

    /// Replace the adjustment. Components may carry any sign; they are
    /// simply summed. The value is left unchanged when the total does not
    /// fit in seconds.
    pub fn set_adjustment(&mut self, hours: i64, minutes: i64, seconds: i64) -> Result<()> {
        let total = hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|secs| minutes.checked_mul(SECS_PER_MINUTE)?.checked_add(secs))
            .and_then(|secs| secs.checked_add(seconds))
            .ok_or_else(|| {
                anyhow!(
                    "time adjustment {hours}h {minutes}m {seconds}s of camera {} overflows",
                    self.id
                )
            })?;
        self.time_adjustment_secs = total;
        Ok(())
    }

    /// The adjustment split into hours, minutes and seconds. All three share
    /// the sign of the total, so feeding them back into
    /// [`Camera::set_adjustment`] reproduces the same value.
    pub fn adjustment_parts(&self) -> (i64, i64, i64) {
        let sign = self.time_adjustment_secs.signum();
        let total = self.time_adjustment_secs.unsigned_abs();
        let hours = (total / SECS_PER_HOUR as u64) as i64;
        let minutes = ((total % SECS_PER_HOUR as u64) / SECS_PER_MINUTE as u64) as i64;
        let seconds = (total % SECS_PER_MINUTE as u64) as i64;
        (sign * hours, sign * minutes, sign * seconds)
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_CAMERA_ID
    }
}

/// Camera id to clock-drift mapping.
///
/// Not synchronized; callers that share a registry across threads wrap it in
/// their own lock.
#[derive(Debug, Clone, Default)]
pub struct CameraRegistry {
    cameras: HashMap<String, Camera>,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a camera by exact id, creating a zero-offset entry on first
    /// sight. Blank ids all resolve to the [`UNKNOWN_CAMERA_ID`] entry.
    pub fn get_or_create(&mut self, camera_id: &str) -> &mut Camera {
        let key = registry_key(camera_id);
        self.cameras
            .entry(key.to_string())
            .or_insert_with(|| Camera::new(key))
    }

    pub fn get(&self, camera_id: &str) -> Option<&Camera> {
        self.cameras.get(registry_key(camera_id))
    }

    pub fn set_adjustment(
        &mut self,
        camera_id: &str,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Result<()> {
        self.get_or_create(camera_id)
            .set_adjustment(hours, minutes, seconds)
    }

    /// Insert or replace a camera wholesale, e.g. when restoring saved offsets.
    pub fn insert(&mut self, camera: Camera) {
        let key = registry_key(&camera.id).to_string();
        self.cameras.insert(key.clone(), Camera { id: key, ..camera });
    }

    /// All cameras, sorted by id.
    pub fn cameras(&self) -> Vec<&Camera> {
        let mut cameras: Vec<&Camera> = self.cameras.values().collect();
        cameras.sort_by(|a, b| a.id.cmp(&b.id));
        cameras
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

/// Key a camera id is stored under; blank ids map to [`UNKNOWN_CAMERA_ID`].
pub(crate) fn registry_key(camera_id: &str) -> &str {
    if camera_id.trim().is_empty() {
        UNKNOWN_CAMERA_ID
    } else {
        camera_id
    }
}
