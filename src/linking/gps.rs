use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{GeoPosition, Photo, TourInterval, TourPhotoLink};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::{log_debug, log_warn};

/// Give photos in tour links the position of the nearest track sample.
///
/// Photos with their own position are left alone; the others get
/// `propagated_geo`. `own_gps_count` and `own_no_gps_count` keep describing
/// embedded positions only, `geo_photo_count` is raised for each newly
/// positioned photo. Returns the number of positions assigned.
pub fn propagate_gps(
    links: &mut [TourPhotoLink],
    photos: &mut [Photo],
    tours: &[TourInterval],
) -> usize {
    let tours_by_id: HashMap<i64, &TourInterval> = tours.iter().map(|t| (t.id, t)).collect();
    let mut assigned = 0;

    for link in links.iter_mut() {
        let Some(tour_id) = link.tour_id() else {
            continue;
        };
        if link.is_empty() {
            continue;
        }
        let Some(tour) = tours_by_id.get(&tour_id) else {
            log_debug!("tour {tour_id} not supplied, skipping positions");
            continue;
        };

        let track = match tour.track_points() {
            Ok(track) => track,
            Err(err) => {
                log_warn!("{err:#}, skipping positions");
                continue;
            }
        };
        if track.is_empty() {
            log_debug!("tour {tour_id} has no track, skipping positions");
            continue;
        }

        let newly_positioned = assign_track_positions(&mut photos[link.photo_range.clone()], &track);
        link.geo_photo_count += newly_positioned;
        assigned += newly_positioned;
    }

    assigned
}

/// Two-pointer walk over time-sorted photos and the track's boundaries.
/// Returns how many photos gained a position they did not have before.
fn assign_track_positions(photos: &mut [Photo], track: &[(DateTime<Utc>, GeoPosition)]) -> usize {
    let boundaries = sample_boundaries(track);
    let mut sample = 0;
    let mut newly_positioned = 0;

    for photo in photos.iter_mut() {
        let time = photo.adjusted_time();
        // The last sample's boundary is open-ended
        while sample + 1 < track.len() && boundaries[sample] < time {
            sample += 1;
        }

        if photo.own_geo.is_some() {
            continue;
        }
        if photo.propagated_geo.is_none() {
            newly_positioned += 1;
        }
        photo.propagated_geo = Some(track[sample].1);
    }

    newly_positioned
}

/// Midpoints between consecutive sample times. A photo at or before
/// `boundaries[k]` (and after `boundaries[k - 1]`) takes sample `k`. The last
/// sample has no boundary.
fn sample_boundaries(track: &[(DateTime<Utc>, GeoPosition)]) -> Vec<DateTime<Utc>> {
    track
        .windows(2)
        .map(|pair| pair[0].0 + (pair[1].0 - pair[0].0) / 2)
        .collect()
}
