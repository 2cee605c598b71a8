use crate::models::TourPhotoLink;

/// Coalesce every run of consecutive history links into one.
///
/// Runs appear where a tour without photos was dropped between two history
/// groups. Members stay in time order because links index contiguous ranges
/// of the sorted photo collection. Applying the pass to its own output
/// changes nothing.
pub fn merge_history_links(links: Vec<TourPhotoLink>) -> Vec<TourPhotoLink> {
    let mut merged: Vec<TourPhotoLink> = Vec::with_capacity(links.len());

    for link in links {
        match merged.last_mut() {
            Some(previous) if previous.is_synthetic() && link.is_synthetic() => {
                absorb(previous, link);
            }
            _ => merged.push(link),
        }
    }

    merged
}

fn absorb(target: &mut TourPhotoLink, next: TourPhotoLink) {
    debug_assert_eq!(target.photo_range.end, next.photo_range.start);

    target.photo_range.end = next.photo_range.end;
    // History links end at their last member
    target.end_time = next.end_time;
    target.own_gps_count += next.own_gps_count;
    target.own_no_gps_count += next.own_no_gps_count;
    target.geo_photo_count += next.geo_photo_count;
    target.camera_ids.extend(next.camera_ids);
}
