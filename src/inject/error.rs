// ABOUTME: Error types for image injection.
// ABOUTME: Separates engine transport failures from unsupported distributions and build failures.

use super::recipe::RecipeError;
use crate::runtime::{ContainerError, ImageError, LogError};

/// Errors that end an injection.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// The engine could not be reached or refused a request.
    #[error("container engine error: {0}")]
    Transport(String),

    /// The OS could not be detected or has no supported update path.
    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(String),

    /// The engine ran the build and reported a failure.
    #[error("image build failed: {0}")]
    BuildFailed(String),

    /// The detected values cannot be placed into a recipe.
    #[error("cannot render build recipe: {0}")]
    Recipe(#[from] RecipeError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectErrorKind {
    Transport,
    UnsupportedDistribution,
    BuildFailed,
    Recipe,
}

impl InjectError {
    pub fn cannot_detect() -> Self {
        InjectError::UnsupportedDistribution("cannot detect OS".to_string())
    }

    pub fn unsupported(distro: &str, version: &str) -> Self {
        InjectError::UnsupportedDistribution(format!(
            "unsupported dist:{} version:{}",
            distro, version
        ))
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> InjectErrorKind {
        match self {
            InjectError::Transport(_) => InjectErrorKind::Transport,
            InjectError::UnsupportedDistribution(_) => InjectErrorKind::UnsupportedDistribution,
            InjectError::BuildFailed(_) => InjectErrorKind::BuildFailed,
            InjectError::Recipe(_) => InjectErrorKind::Recipe,
        }
    }
}

impl From<ContainerError> for InjectError {
    fn from(err: ContainerError) -> Self {
        InjectError::Transport(err.to_string())
    }
}

impl From<LogError> for InjectError {
    fn from(err: LogError) -> Self {
        InjectError::Transport(err.to_string())
    }
}

impl From<ImageError> for InjectError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::BuildFailed(message) => InjectError::BuildFailed(message),
            other => InjectError::Transport(other.to_string()),
        }
    }
}
