use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::SortName;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A photo as delivered by the metadata reader, plus the fields the linking
/// pipeline derives from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Stable key, usually the file path.
    pub id: String,
    #[serde(rename = "captureTime")]
    pub raw_capture_time: DateTime<Utc>,
    /// Camera model from EXIF; empty when the file carries none.
    #[serde(default)]
    pub camera_id: String,
    /// Position embedded in the file itself.
    #[serde(default)]
    pub own_geo: Option<GeoPosition>,
    /// Position taken from a tour track. Only ever set when `own_geo` is `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagated_geo: Option<GeoPosition>,
    #[serde(default, rename = "adjustedTime", skip_serializing_if = "Option::is_none")]
    adjusted: Option<DateTime<Utc>>,
}

impl Photo {
    pub fn new(
        id: impl Into<String>,
        raw_capture_time: DateTime<Utc>,
        camera_id: impl Into<String>,
        own_geo: Option<GeoPosition>,
    ) -> Self {
        Self {
            id: id.into(),
            raw_capture_time,
            camera_id: camera_id.into(),
            own_geo,
            propagated_geo: None,
            adjusted: None,
        }
    }

    /// Capture time after camera clock correction. Equal to the raw capture
    /// time until the photo has been normalized.
    pub fn adjusted_time(&self) -> DateTime<Utc> {
        self.adjusted.unwrap_or(self.raw_capture_time)
    }

    pub fn set_adjusted_time(&mut self, adjusted: DateTime<Utc>) {
        self.adjusted = Some(adjusted);
    }

    pub fn has_own_geo(&self) -> bool {
        self.own_geo.is_some()
    }

    /// Own position if present, otherwise the propagated one.
    pub fn position(&self) -> Option<GeoPosition> {
        self.own_geo.or(self.propagated_geo)
    }

    pub fn file_name(&self) -> &str {
        Path::new(&self.id)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.id)
    }
}

impl SortName for Photo {
    fn sort_name(&self) -> &str {
        self.file_name()
    }
}
