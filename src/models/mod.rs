pub mod link;
pub mod photo;
pub mod tour;

pub use link::{LinkKind, TourPhotoLink};
pub use photo::{GeoPosition, Photo};
pub use tour::{validation, GeoSample, TourInterval};
