// ABOUTME: Composable capability traits for container engines.
// ABOUTME: Defines ImageOps, ContainerOps, LogOps, RuntimeInfo and the ContainerEngine union.

mod container;
mod image;
mod logs;
mod runtime_info;
mod shared_types;

pub use container::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
pub use image::{BuildStream, ImageError, ImageOps};
pub use logs::{LogError, LogLine, LogLines, LogOps, LogOptions, LogStream};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;

/// Everything image injection needs from an engine.
///
/// Implemented automatically for any type providing the three capabilities,
/// so tests can hand in an in-memory engine.
pub trait ContainerEngine: ImageOps + ContainerOps + LogOps {}

impl<T: ImageOps + ContainerOps + LogOps> ContainerEngine for T {}
