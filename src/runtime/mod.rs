// ABOUTME: Container engine access for Docker and Podman.
// ABOUTME: Capability traits, the bollard-backed client and local runtime discovery.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use bollard::{BollardRuntime, build_file_archive, connect};
pub use detection::{DetectionError, detect_local, resolve_endpoint};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::RuntimeInfo as RuntimeInfoTrait;
pub use traits::{
    BuildOptions, BuildProgress, BuildRequest, BuildStream, ContainerConfig, ContainerEngine,
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, DOCKER_HUB_AUTH_SERVER,
    FileUpload, ImageError, ImageOps, LogError, LogLine, LogLines, LogOps, LogOptions, LogStream,
    RegistryAuth, RuntimeInfoError, RuntimeMetadata,
};
pub use types::{DEFAULT_TIMEOUT, RuntimeConfig, RuntimeEndpoint, RuntimeType};
