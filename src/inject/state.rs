// ABOUTME: Injection state marker types for the type state pattern.
// ABOUTME: Each state carries what the earlier steps produced.

use super::distro::UpdatePlan;
use super::probe::DetectionResult;
use crate::types::ImageId;

/// Initial state: nothing known about the source image.
/// Available actions: `detect()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// The probe identified the source image.
/// Available actions: `resolve()`
#[derive(Debug, Clone)]
pub struct Detected {
    pub(crate) detection: DetectionResult,
}

/// An update plan exists for the detected distribution.
/// Available actions: `recipe()`, `build()`
#[derive(Debug, Clone)]
pub struct Resolved {
    pub(crate) detection: DetectionResult,
    pub(crate) plan: UpdatePlan,
}

/// The engine finished building the tagged image.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Built {
    pub(crate) detection: DetectionResult,
    pub(crate) plan: UpdatePlan,
    pub(crate) image_id: Option<ImageId>,
}
