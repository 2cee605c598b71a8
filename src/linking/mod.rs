pub mod algorithm;
pub mod config;
pub mod filter;
pub mod gps;
pub mod merge;
pub mod normalize;

pub use algorithm::{build_links, link_photos, LinkedPhotos};
pub use config::LinkingConfig;
pub use filter::{filter_links, LinkFilter};
pub use gps::propagate_gps;
pub use merge::merge_history_links;
pub use normalize::{normalize, normalize_and_sort};
