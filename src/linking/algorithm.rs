use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::camera::CameraRegistry;
use crate::linking::config::LinkingConfig;
use crate::models::validation::{validate_photo_order, validate_tours};
use crate::models::{LinkKind, Photo, TourInterval, TourPhotoLink};
use crate::utils::sort_naturally;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Output of one pipeline run: the photos in adjusted-time order and the
/// links indexing into them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPhotos {
    pub photos: Vec<Photo>,
    pub links: Vec<TourPhotoLink>,
}

impl LinkedPhotos {
    pub fn members(&self, link: &TourPhotoLink) -> &[Photo] {
        link.photos(&self.photos)
    }

    /// Links paired with their member photos, in time order.
    pub fn iter(&self) -> impl Iterator<Item = (&TourPhotoLink, &[Photo])> {
        self.links.iter().map(move |link| (link, self.members(link)))
    }

    /// Members ordered by file name instead of time, for gallery display.
    pub fn members_by_name(&self, link: &TourPhotoLink) -> Vec<&Photo> {
        let mut members: Vec<&Photo> = self.members(link).iter().collect();
        sort_naturally(&mut members);
        members
    }

    pub fn real_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_real()).count()
    }

    pub fn synthetic_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_synthetic()).count()
    }
}

/// Main linking function: normalizes capture times, groups photos by tour,
/// merges history groups and fills in track positions.
///
/// Every call is independent. Photos carrying positions from an earlier run
/// have them cleared before linking.
pub fn link_photos(
    mut photos: Vec<Photo>,
    tours: &[TourInterval],
    registry: &mut CameraRegistry,
    config: &LinkingConfig,
) -> Result<LinkedPhotos> {
    use crate::linking::{gps::propagate_gps, merge::merge_history_links, normalize::normalize_and_sort};

    // Edge case: nothing to link
    if photos.is_empty() && !config.emit_empty_tour_links {
        return Ok(LinkedPhotos::default());
    }

    // Step 1: Adjusted times and time order
    for photo in &mut photos {
        photo.propagated_geo = None;
    }
    normalize_and_sort(&mut photos, registry)?;

    // Step 2: Sweep photos against tours
    let mut links = build_links(&photos, tours, config)?;
    log_debug!("built {} links from {} photos", links.len(), photos.len());

    // Step 3: History merge
    if config.merge_history_links {
        links = merge_history_links(links);
    }

    // Step 4: Track positions
    let propagated = if config.propagate_gps {
        propagate_gps(&mut links, &mut photos, tours)
    } else {
        0
    };

    let linked = LinkedPhotos { photos, links };
    log_info!(
        "linked {} photos into {} links ({} tour, {} history), {} positions from tracks",
        linked.photos.len(),
        linked.links.len(),
        linked.real_link_count(),
        linked.synthetic_link_count(),
        propagated
    );

    Ok(linked)
}

/// Partition time-sorted photos into links with one forward pass over the
/// photos and the tour intervals.
///
/// `photos` must be ascending by adjusted time, `tours` ascending by start
/// and non-overlapping. Both are checked before the sweep.
pub fn build_links(
    photos: &[Photo],
    tours: &[TourInterval],
    config: &LinkingConfig,
) -> Result<Vec<TourPhotoLink>> {
    if let Err(err) = validate_tours(tours).and_then(|_| validate_photo_order(photos)) {
        log_warn!("rejecting link input: {err}");
        return Err(err);
    }

    let mut links = Vec::new();
    let mut current_link: Option<TourPhotoLink> = None;
    let mut tour_index = 0;
    // Whether the tour under the cursor already has a link
    let mut tour_linked = false;

    for (photo_index, photo) in photos.iter().enumerate() {
        let time = photo.adjusted_time();

        let extends_current = match &current_link {
            Some(link) if link.is_real() => time <= tours[tour_index].end_time,
            Some(_) => tours
                .get(tour_index)
                .map_or(true, |tour| time < tour.start_time),
            None => false,
        };

        if !extends_current {
            if let Some(link) = current_link.take() {
                finalize_link(link, &mut links, config);
            }

            // Skip tours that ended before this photo
            while tour_index < tours.len() && tours[tour_index].end_time < time {
                if !tour_linked {
                    skip_empty_tour(&tours[tour_index], photo_index, &mut links, config);
                }
                tour_index += 1;
                tour_linked = false;
            }

            current_link = Some(match tours.get(tour_index) {
                Some(tour) if tour.contains(time) => {
                    tour_linked = true;
                    open_tour_link(tour, photo_index)
                }
                _ => open_history_link(time, photo_index),
            });
        }

        if let Some(link) = current_link.as_mut() {
            link.photo_range.end = photo_index + 1;
            if link.is_synthetic() {
                link.end_time = time;
            }
            link.record_photo(photo);
        }
    }

    if let Some(link) = current_link.take() {
        finalize_link(link, &mut links, config);
    }

    // Tours after the last photo
    for tour in tours.iter().skip(tour_index) {
        if tour_linked {
            tour_linked = false;
            continue;
        }
        skip_empty_tour(tour, photos.len(), &mut links, config);
    }

    Ok(links)
}

fn open_tour_link(tour: &TourInterval, photo_index: usize) -> TourPhotoLink {
    TourPhotoLink {
        id: Uuid::new_v4().to_string(),
        kind: LinkKind::Real { tour_id: tour.id },
        start_time: tour.start_time,
        end_time: tour.end_time,
        photo_range: photo_index..photo_index,
        own_gps_count: 0,
        own_no_gps_count: 0,
        geo_photo_count: 0,
        camera_ids: BTreeSet::new(),
    }
}

fn open_history_link(time: DateTime<Utc>, photo_index: usize) -> TourPhotoLink {
    TourPhotoLink {
        id: Uuid::new_v4().to_string(),
        kind: LinkKind::Synthetic,
        start_time: time,
        end_time: time,
        photo_range: photo_index..photo_index,
        own_gps_count: 0,
        own_no_gps_count: 0,
        geo_photo_count: 0,
        camera_ids: BTreeSet::new(),
    }
}

fn skip_empty_tour(
    tour: &TourInterval,
    photo_index: usize,
    links: &mut Vec<TourPhotoLink>,
    config: &LinkingConfig,
) {
    finalize_link(open_tour_link(tour, photo_index), links, config);
}

/// Push a finished link. Tour links without photos are only kept when the
/// config asks for them.
fn finalize_link(link: TourPhotoLink, links: &mut Vec<TourPhotoLink>, config: &LinkingConfig) {
    if link.is_real() && link.is_empty() && !config.emit_empty_tour_links {
        log_debug!("dropping tour {:?} without photos", link.tour_id());
        return;
    }
    links.push(link);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPosition, GeoSample};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn make_photos(times: &[i64]) -> Vec<Photo> {
        times
            .iter()
            .map(|t| Photo::new(format!("IMG_{t}.jpg"), at(*t), "", None))
            .collect()
    }

    fn member_times(link: &TourPhotoLink, photos: &[Photo]) -> Vec<i64> {
        link.photos(photos)
            .iter()
            .map(|p| p.adjusted_time().timestamp())
            .collect()
    }

    #[test]
    fn test_no_tours_single_history_link() {
        let photos = make_photos(&[10, 20, 30, 40]);
        let links = build_links(&photos, &[], &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 1);
        assert!(links[0].is_synthetic());
        assert_eq!(links[0].photo_range, 0..4);
        assert_eq!(links[0].start_time, at(10));
        assert_eq!(links[0].end_time, at(40));
    }

    #[test]
    fn test_empty_photos_no_links() {
        let tours = vec![TourInterval::new(1, at(0), at(10))];
        let links = build_links(&[], &tours, &LinkingConfig::default()).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_reference_scenario_before_merge() {
        let photos = make_photos(&[100, 150, 400, 500, 900]);
        let tours = vec![
            TourInterval::new(1, at(120), at(300)),
            TourInterval::new(2, at(600), at(800)),
        ];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 4);
        assert!(links[0].is_synthetic());
        assert_eq!(member_times(&links[0], &photos), vec![100]);
        assert_eq!(links[1].tour_id(), Some(1));
        assert_eq!(member_times(&links[1], &photos), vec![150]);
        assert_eq!(links[1].start_time, at(120));
        assert_eq!(links[1].end_time, at(300));
        assert!(links[2].is_synthetic());
        assert_eq!(member_times(&links[2], &photos), vec![400, 500]);
        assert!(links[3].is_synthetic());
        assert_eq!(member_times(&links[3], &photos), vec![900]);
    }

    #[test]
    fn test_history_link_ends_at_last_photo() {
        let photos = make_photos(&[100, 200]);
        let tours = vec![TourInterval::new(1, at(1000), at(2000))];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].end_time, at(200));
    }

    #[test]
    fn test_end_boundary_goes_to_current_tour() {
        let photos = make_photos(&[150, 200]);
        let tours = vec![
            TourInterval::new(1, at(100), at(200)),
            TourInterval::new(2, at(200), at(300)),
        ];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tour_id(), Some(1));
        assert_eq!(links[0].photo_count(), 2);
    }

    #[test]
    fn test_start_boundary_opens_tour() {
        let photos = make_photos(&[50, 100]);
        let tours = vec![TourInterval::new(1, at(100), at(200))];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 2);
        assert!(links[0].is_synthetic());
        assert_eq!(links[1].tour_id(), Some(1));
        assert_eq!(member_times(&links[1], &photos), vec![100]);
    }

    #[test]
    fn test_adjacent_tours_never_merge() {
        let photos = make_photos(&[110, 210]);
        let tours = vec![
            TourInterval::new(1, at(100), at(200)),
            TourInterval::new(2, at(201), at(300)),
        ];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].tour_id(), Some(1));
        assert_eq!(links[1].tour_id(), Some(2));
    }

    #[test]
    fn test_emit_empty_tour_links() {
        let photos = make_photos(&[100, 150, 400, 500, 900]);
        let tours = vec![
            TourInterval::new(0, at(10), at(20)),
            TourInterval::new(1, at(120), at(300)),
            TourInterval::new(2, at(600), at(800)),
            TourInterval::new(3, at(1000), at(1100)),
        ];
        let config = LinkingConfig {
            emit_empty_tour_links: true,
            ..LinkingConfig::default()
        };
        let links = build_links(&photos, &tours, &config).unwrap();

        let kinds: Vec<Option<i64>> = links.iter().map(|l| l.tour_id()).collect();
        assert_eq!(
            kinds,
            vec![Some(0), None, Some(1), None, Some(2), None, Some(3)]
        );
        assert!(links[0].is_empty());
        assert_eq!(links[0].photo_range, 0..0);
        assert!(links[4].is_empty());
        assert_eq!(links[4].photo_range, 4..4);
        assert_eq!(links[6].photo_range, 5..5);
    }

    #[test]
    fn test_emit_empty_skips_linked_trailing_tour() {
        let photos = make_photos(&[150]);
        let tours = vec![
            TourInterval::new(1, at(100), at(200)),
            TourInterval::new(2, at(300), at(400)),
        ];
        let config = LinkingConfig {
            emit_empty_tour_links: true,
            ..LinkingConfig::default()
        };
        let links = build_links(&photos, &tours, &config).unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].tour_id(), Some(1));
        assert_eq!(links[0].photo_count(), 1);
        assert_eq!(links[1].tour_id(), Some(2));
        assert!(links[1].is_empty());
    }

    #[test]
    fn test_counts_and_cameras() {
        let photos = vec![
            Photo::new("a.jpg", at(110), "Canon", Some(GeoPosition::new(1.0, 1.0))),
            Photo::new("b.jpg", at(120), "Sony", None),
            Photo::new("c.jpg", at(130), "Sony", None),
        ];
        let tours = vec![TourInterval::new(1, at(100), at(200))];
        let links = build_links(&photos, &tours, &LinkingConfig::default()).unwrap();

        assert_eq!(links[0].own_gps_count, 1);
        assert_eq!(links[0].own_no_gps_count, 2);
        let cameras: Vec<&str> = links[0].camera_ids.iter().map(String::as_str).collect();
        assert_eq!(cameras, vec!["Canon", "Sony"]);
    }

    #[test]
    fn test_rejects_unsorted_photos() {
        let photos = make_photos(&[300, 100]);
        assert!(build_links(&photos, &[], &LinkingConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_overlapping_tours() {
        let photos = make_photos(&[100]);
        let tours = vec![
            TourInterval::new(1, at(0), at(200)),
            TourInterval::new(2, at(100), at(300)),
        ];
        assert!(build_links(&photos, &tours, &LinkingConfig::default()).is_err());
    }

    #[test]
    fn test_link_photos_reference_scenario() {
        let photos = make_photos(&[900, 100, 500, 150, 400]);
        let tours = vec![
            TourInterval::new(1, at(120), at(300)),
            TourInterval::new(2, at(600), at(800)),
        ];
        let mut registry = CameraRegistry::new();
        let linked = link_photos(photos, &tours, &mut registry, &LinkingConfig::default()).unwrap();

        assert_eq!(linked.links.len(), 3);
        let groups: Vec<Vec<i64>> = linked
            .links
            .iter()
            .map(|l| member_times(l, &linked.photos))
            .collect();
        assert_eq!(groups, vec![vec![100], vec![150], vec![400, 500, 900]]);
        assert!(linked.links[0].is_synthetic());
        assert_eq!(linked.links[1].tour_id(), Some(1));
        assert!(linked.links[2].is_synthetic());
        assert_eq!(linked.links[2].end_time, at(900));
        assert_eq!(linked.real_link_count(), 1);
        assert_eq!(linked.synthetic_link_count(), 2);
    }

    #[test]
    fn test_link_photos_offset_change_relinks() {
        let tours = vec![TourInterval::new(1, at(10_000), at(20_000))];
        let photos = vec![Photo::new("a.jpg", at(8_000), "cam", None)];
        let mut registry = CameraRegistry::new();

        let first = link_photos(photos.clone(), &tours, &mut registry, &LinkingConfig::default()).unwrap();
        assert!(first.links[0].is_synthetic());

        registry.set_adjustment("cam", 1, 0, 0).unwrap();
        let second = link_photos(photos, &tours, &mut registry, &LinkingConfig::default()).unwrap();
        assert_eq!(second.links[0].tour_id(), Some(1));
        assert_eq!(second.photos[0].adjusted_time(), at(11_600));

        // the first result is untouched by the re-run
        assert!(first.links[0].is_synthetic());
    }

    #[test]
    fn test_link_photos_rejects_out_of_range_input() {
        let photos = vec![Photo::new("a.jpg", at(100), "cam", None)];
        let mut registry = CameraRegistry::new();
        registry.set_adjustment("cam", 10_000_000_000, 0, 0).unwrap();
        let result = link_photos(photos.clone(), &[], &mut registry, &LinkingConfig::default());
        assert!(result.is_err());

        let tours = vec![TourInterval::new(1, at(0), at(1000)).with_geo_track(vec![GeoSample {
            offset_secs: i64::MAX / 100,
            latitude: 0.0,
            longitude: 0.0,
        }])];
        let mut registry = CameraRegistry::new();
        let result = link_photos(photos, &tours, &mut registry, &LinkingConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_members_by_name() {
        let photos = vec![
            Photo::new("/trip/IMG_10.jpg", at(110), "", None),
            Photo::new("/trip/IMG_9.jpg", at(120), "", None),
            Photo::new("/trip/IMG_100.jpg", at(130), "", None),
        ];
        let mut registry = CameraRegistry::new();
        let linked = link_photos(photos, &[], &mut registry, &LinkingConfig::default()).unwrap();

        let names: Vec<&str> = linked
            .members_by_name(&linked.links[0])
            .iter()
            .map(|p| p.file_name())
            .collect();
        assert_eq!(names, vec!["IMG_9.jpg", "IMG_10.jpg", "IMG_100.jpg"]);
    }

    #[test]
    fn test_link_photos_empty_input() {
        let mut registry = CameraRegistry::new();
        let linked = link_photos(Vec::new(), &[], &mut registry, &LinkingConfig::default()).unwrap();
        assert!(linked.links.is_empty());
        assert!(linked.photos.is_empty());
    }
}
