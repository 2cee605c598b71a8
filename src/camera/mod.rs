pub mod registry;
pub mod store;

pub use registry::{Camera, CameraRegistry, UNKNOWN_CAMERA_ID};
pub use store::CameraStore;
