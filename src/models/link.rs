use std::collections::BTreeSet;
use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Photo;
use crate::camera::registry::registry_key;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum LinkKind {
    /// Bound to a recorded tour.
    #[serde(rename_all = "camelCase")]
    Real { tour_id: i64 },
    /// Placeholder ("history") group for photos outside every known tour.
    Synthetic,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Real { .. } => "real",
            LinkKind::Synthetic => "synthetic",
        }
    }
}

/// A time-contiguous group of photos.
///
/// Members are stored as a range into the time-sorted photo collection the
/// link was built from, so a link never owns its photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPhotoLink {
    pub id: String,
    pub kind: LinkKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub photo_range: Range<usize>,
    /// Members with a position embedded in the file.
    pub own_gps_count: usize,
    /// Members without an embedded position.
    pub own_no_gps_count: usize,
    /// Members with any position, own or propagated from the tour track.
    pub geo_photo_count: usize,
    pub camera_ids: BTreeSet<String>,
}

impl TourPhotoLink {
    pub fn tour_id(&self) -> Option<i64> {
        match self.kind {
            LinkKind::Real { tour_id } => Some(tour_id),
            LinkKind::Synthetic => None,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self.kind, LinkKind::Real { .. })
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind == LinkKind::Synthetic
    }

    pub fn photo_count(&self) -> usize {
        self.photo_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photo_range.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Member photos, resolved against the collection the link indexes into.
    pub fn photos<'a>(&self, photos: &'a [Photo]) -> &'a [Photo] {
        &photos[self.photo_range.clone()]
    }

    /// Count a newly appended member.
    pub(crate) fn record_photo(&mut self, photo: &Photo) {
        if photo.has_own_geo() {
            self.own_gps_count += 1;
        } else {
            self.own_no_gps_count += 1;
        }
        if photo.position().is_some() {
            self.geo_photo_count += 1;
        }
        self.camera_ids
            .insert(registry_key(&photo.camera_id).to_string());
    }
}
