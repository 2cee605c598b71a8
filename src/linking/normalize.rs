use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::camera::CameraRegistry;
use crate::models::Photo;

/// Apply the camera's clock drift to one photo and return the adjusted time.
/// Cameras seen for the first time are registered with a zero offset.
/// Fails, leaving the photo untouched, when the shifted time is out of range.
pub fn normalize(photo: &mut Photo, registry: &mut CameraRegistry) -> Result<DateTime<Utc>> {
    let camera = registry.get_or_create(&photo.camera_id);
    let adjustment = camera.time_adjustment()?;
    let adjusted = photo
        .raw_capture_time
        .checked_add_signed(adjustment)
        .ok_or_else(|| {
            anyhow!(
                "adjusted time of photo {} is out of range: {} shifted by {}s from camera {}",
                photo.id,
                photo.raw_capture_time,
                camera.time_adjustment_secs,
                camera.id
            )
        })?;
    photo.set_adjusted_time(adjusted);
    Ok(adjusted)
}

/// Normalize every photo, then order them by adjusted time. The sort is
/// stable so burst shots with equal times keep their input order.
pub fn normalize_and_sort(photos: &mut [Photo], registry: &mut CameraRegistry) -> Result<()> {
    for photo in photos.iter_mut() {
        normalize(photo, registry)?;
    }
    photos.sort_by_key(|photo| photo.adjusted_time());
    Ok(())
}
