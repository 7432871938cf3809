// ABOUTME: Image operations trait for container engines.
// ABOUTME: Pull images, check their presence and build new ones from a recipe.

use super::shared_types::{BuildProgress, BuildRequest, RegistryAuth};
use crate::types::ImageRef;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Progress events of a running build, in engine order.
///
/// The stream may borrow the engine client, so it lives no longer than it.
pub type BuildStream<'a> =
    Pin<Box<dyn Stream<Item = Result<BuildProgress, ImageError>> + Send + 'a>>;

/// Image operations: pull, check existence, build.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image from a registry.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError>;

    /// Check if an image exists locally.
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError>;

    /// Submit a build. The returned stream ends when the engine finishes;
    /// an engine-reported failure arrives as `ImageError::BuildFailed`.
    async fn build_image<'a>(
        &'a self,
        request: &BuildRequest,
        auth: Option<&RegistryAuth>,
    ) -> Result<BuildStream<'a>, ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
