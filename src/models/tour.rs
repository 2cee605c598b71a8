//! Tour interval data model.
//!
//! A tour is one recorded activity: a closed time span, optionally with the
//! GPS track sampled during it. Intervals are produced by the tour database
//! and are read-only to the linking pipeline.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPosition;

/// One track sample, positioned relative to the tour start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoSample {
    pub offset_secs: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoSample {
    /// `None` when the offset exceeds what a `Duration` can hold.
    pub fn offset(&self) -> Option<Duration> {
        Duration::try_seconds(self.offset_secs)
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourInterval {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub geo_track: Option<Vec<GeoSample>>,
}

impl TourInterval {
    pub fn new(id: i64, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id,
            start_time,
            end_time,
            geo_track: None,
        }
    }

    pub fn with_geo_track(mut self, samples: Vec<GeoSample>) -> Self {
        self.geo_track = Some(samples);
        self
    }

    /// Closed-interval membership: both endpoints belong to the tour.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Samples with their absolute times. Empty when the tour has no track.
    pub fn track_points(&self) -> Result<Vec<(DateTime<Utc>, GeoPosition)>> {
        self.geo_track
            .iter()
            .flatten()
            .map(|sample| Ok((self.sample_time(sample)?, sample.position())))
            .collect()
    }

    fn sample_time(&self, sample: &GeoSample) -> Result<DateTime<Utc>> {
        sample
            .offset()
            .and_then(|offset| self.start_time.checked_add_signed(offset))
            .ok_or_else(|| {
                anyhow!(
                    "geo sample of tour {} is out of range: {}s after {}",
                    self.id,
                    sample.offset_secs,
                    self.start_time
                )
            })
    }
}

/// Boundary checks for caller-supplied intervals and photo order.
pub mod validation {
    use std::collections::HashSet;

    use anyhow::{bail, Result};

    use super::TourInterval;
    use crate::models::Photo;

    /// Intervals must be well-formed, ascending by start and mutually
    /// non-overlapping. Touching endpoints are accepted.
    pub fn validate_tours(tours: &[TourInterval]) -> Result<()> {
        let mut seen_ids = HashSet::with_capacity(tours.len());

        for tour in tours {
            if tour.start_time > tour.end_time {
                bail!(
                    "tour {} starts at {} after its end {}",
                    tour.id,
                    tour.start_time,
                    tour.end_time
                );
            }
            if !seen_ids.insert(tour.id) {
                bail!("tour {} appears more than once", tour.id);
            }
            if let Some(track) = &tour.geo_track {
                if track
                    .windows(2)
                    .any(|pair| pair[1].offset_secs < pair[0].offset_secs)
                {
                    bail!("geo track of tour {} is not sorted by offset", tour.id);
                }
                tour.track_points()?;
            }
        }

        for pair in tours.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_time < prev.start_time {
                bail!(
                    "tours are not sorted by start time: {} ({}) before {} ({})",
                    prev.id,
                    prev.start_time,
                    next.id,
                    next.start_time
                );
            }
            if next.start_time < prev.end_time {
                bail!(
                    "tour {} overlaps tour {}: starts {} before {} ends {}",
                    next.id,
                    prev.id,
                    next.start_time,
                    prev.id,
                    prev.end_time
                );
            }
        }

        Ok(())
    }

    /// Photos must be ascending by adjusted time.
    pub fn validate_photo_order(photos: &[Photo]) -> Result<()> {
        if let Some(pair) = photos
            .windows(2)
            .find(|pair| pair[1].adjusted_time() < pair[0].adjusted_time())
        {
            bail!(
                "photos are not sorted by adjusted time: {} ({}) before {} ({})",
                pair[0].id,
                pair[0].adjusted_time(),
                pair[1].id,
                pair[1].adjusted_time()
            );
        }
        Ok(())
    }
}
