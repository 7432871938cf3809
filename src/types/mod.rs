// ABOUTME: Typed identifiers and validated image references.
// ABOUTME: Keeps container IDs, image IDs and image names from being mixed up.

mod id;
mod image_ref;

pub use id::{ContainerId, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
