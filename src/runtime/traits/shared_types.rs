// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: ContainerConfig, FileUpload, BuildRequest, BuildProgress, RegistryAuth, etc.

use crate::types::{ImageId, ImageRef};
use std::collections::HashMap;
use std::fmt;

/// Configuration for creating a container.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Name for the container.
    pub name: String,
    /// Image to run.
    pub image: ImageRef,
    /// Environment variables.
    pub env: HashMap<String, String>,
    /// Labels to apply.
    pub labels: HashMap<String, String>,
    /// Command to run (overrides image CMD). `Some(vec![])` clears it.
    pub command: Option<Vec<String>>,
    /// Entrypoint (overrides image ENTRYPOINT).
    pub entrypoint: Option<Vec<String>>,
    /// User to run as. `None` keeps the image default.
    pub user: Option<String>,
}

impl ContainerConfig {
    pub fn new(name: impl Into<String>, image: ImageRef) -> Self {
        Self {
            name: name.into(),
            image,
            env: HashMap::new(),
            labels: HashMap::new(),
            command: None,
            entrypoint: None,
            user: None,
        }
    }
}

/// A single file to place inside a container.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Absolute destination path. Missing parent directories are created.
    pub path: String,
    pub content: Vec<u8>,
    /// Unix permission bits.
    pub mode: u32,
}

/// Registry authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    /// Username.
    pub username: String,
    /// Password or token.
    pub password: String,
    /// Registry server (e.g., "ghcr.io"). `None` means Docker Hub.
    pub server: Option<String>,
}

/// Server address Docker Hub credentials are keyed under.
pub const DOCKER_HUB_AUTH_SERVER: &str = "https://index.docker.io/v1/";

impl RegistryAuth {
    /// The address the engine expects these credentials to be keyed by.
    pub fn server_address(&self) -> &str {
        self.server.as_deref().unwrap_or(DOCKER_HUB_AUTH_SERVER)
    }
}

/// Knobs of an image build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Remove intermediate containers, even when the build fails.
    pub force_remove_intermediate: bool,
    /// Ignore the layer cache so every step re-executes.
    pub no_cache: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            force_remove_intermediate: true,
            no_cache: true,
        }
    }
}

/// A build of one recipe into one tag. The recipe is the whole build context.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub recipe: String,
    pub tag: ImageRef,
    pub options: BuildOptions,
}

/// A progress event emitted by the engine while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildProgress {
    /// Output of a build step.
    Output(String),
    /// Status line, e.g. layer download progress of the base image.
    Status(String),
    /// The engine reported the ID of the image it produced.
    Built(ImageId),
}

impl fmt::Display for BuildProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildProgress::Output(text) | BuildProgress::Status(text) => {
                f.write_str(text.trim_end_matches(['\r', '\n']))
            }
            BuildProgress::Built(id) => write!(f, "built image {}", id.short()),
        }
    }
}

/// Runtime metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Runtime name (e.g., "docker", "podman").
    pub name: String,
    /// Runtime version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}
