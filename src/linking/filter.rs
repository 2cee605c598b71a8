use serde::{Deserialize, Serialize};

use crate::models::TourPhotoLink;

/// Display filter over finished links.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LinkFilter {
    #[default]
    All,
    /// Links with at least one positioned photo, own or propagated.
    WithGps,
    /// Links with at least one photo that has no position at all.
    WithoutGps,
    ToursOnly,
    HistoryOnly,
}

impl LinkFilter {
    pub fn matches(&self, link: &TourPhotoLink) -> bool {
        match self {
            LinkFilter::All => true,
            LinkFilter::WithGps => link.geo_photo_count > 0,
            LinkFilter::WithoutGps => link.photo_count() > link.geo_photo_count,
            LinkFilter::ToursOnly => link.is_real(),
            LinkFilter::HistoryOnly => link.is_synthetic(),
        }
    }
}

pub fn filter_links(links: &[TourPhotoLink], filter: LinkFilter) -> Vec<&TourPhotoLink> {
    links.iter().filter(|link| filter.matches(link)).collect()
}
