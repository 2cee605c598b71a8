pub mod camera;
pub mod linking;
pub mod models;
pub mod utils;

pub use camera::{Camera, CameraRegistry, CameraStore, UNKNOWN_CAMERA_ID};
pub use linking::{
    build_links, filter_links, link_photos, merge_history_links, propagate_gps, LinkFilter,
    LinkedPhotos, LinkingConfig,
};
pub use models::{GeoPosition, GeoSample, LinkKind, Photo, TourInterval, TourPhotoLink};
