// ABOUTME: Bollard-based container engine client.
// ABOUTME: Supports both Docker and Podman via the Docker-compatible API.

use crate::runtime::traits::{
    BuildProgress, BuildRequest, BuildStream, ContainerConfig, ContainerError, ContainerFilters,
    ContainerOps, ContainerSummary, FileUpload, ImageError, ImageOps, LogError, LogLine, LogLines,
    LogOps, LogOptions, LogStream, RegistryAuth, RuntimeInfo, RuntimeInfoError, RuntimeMetadata,
};
use crate::runtime::types::{RuntimeConfig, RuntimeEndpoint, RuntimeType};
use crate::types::{ContainerId, ImageId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    BuildImageOptions, CreateContainerOptions, CreateImageOptions, ListContainersOptions,
    LogsOptions, RemoveContainerOptions, UploadToContainerOptions, WaitContainerOptions,
};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{Either, Full};
use std::collections::HashMap;
use std::path::{Component, Path};

/// File name of the recipe inside the build context.
const RECIPE_FILE: &str = "Dockerfile";

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 401 || *status_code == 403 => {
            ImageError::AuthenticationFailed(format!("{}: {}", image_name, message))
        }
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ImageError::NotFound(format!("{}: {}", image_name, message)),
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_build_error(e: bollard::errors::Error) -> ImageError {
    match e {
        bollard::errors::Error::DockerStreamError { error } => ImageError::BuildFailed(error),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if status_code < 500 => ImageError::BuildFailed(message),
        other => ImageError::Runtime(other.to_string()),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn credentials(auth: &RegistryAuth) -> DockerCredentials {
    DockerCredentials {
        username: Some(auth.username.clone()),
        password: Some(auth.password.clone()),
        serveraddress: Some(auth.server_address().to_string()),
        ..Default::default()
    }
}

// =============================================================================
// Archives
// =============================================================================

/// Pack one file into a tar archive rooted at `/`, with entries for every
/// missing parent directory so extraction works in bare images.
pub fn build_file_archive(file: &FileUpload) -> std::io::Result<Vec<u8>> {
    let relative = Path::new(&file.path)
        .strip_prefix("/")
        .map_err(|_| invalid_path(&file.path))?;
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid_path(&file.path));
    }

    let mut ar = tar::Builder::new(Vec::new());

    let mut parents: Vec<&Path> = relative.ancestors().skip(1).collect();
    parents.reverse();
    for dir in parents.into_iter().filter(|d| !d.as_os_str().is_empty()) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_path(dir)?;
        header.set_size(0);
        header.set_mode(0o755);
        header.set_cksum();
        ar.append(&header, std::io::empty())?;
    }

    let mut header = tar::Header::new_gnu();
    header.set_path(relative)?;
    header.set_size(file.content.len() as u64);
    header.set_mode(file.mode);
    header.set_cksum();
    ar.append(&header, file.content.as_slice())?;

    ar.into_inner()
}

fn invalid_path(path: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("upload path must be absolute and normalized: {path}"),
    )
}

/// Build context holding nothing but the recipe.
fn recipe_context(recipe: &str) -> std::io::Result<Vec<u8>> {
    let mut ar = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_path(RECIPE_FILE)?;
    header.set_size(recipe.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    ar.append(&header, recipe.as_bytes())?;
    ar.into_inner()
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container engine client using bollard.
///
/// Supports both Docker and Podman via the Docker-compatible API. All
/// connection settings are fixed at construction.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to the runtime listening at `endpoint`.
    pub fn connect(
        endpoint: &RuntimeEndpoint,
        config: &RuntimeConfig,
    ) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &endpoint.socket_path,
            config.timeout.as_secs(),
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, endpoint.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

/// Resolve the endpoint from `config` and connect to it.
pub fn connect(config: &RuntimeConfig) -> Result<BollardRuntime, crate::runtime::RuntimeError> {
    let endpoint = super::detection::resolve_endpoint(config)?;
    tracing::debug!(
        runtime = %endpoint.runtime_type,
        socket = %endpoint.socket_path,
        "connecting to container runtime"
    );
    Ok(BollardRuntime::connect(&endpoint, config)?)
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker".to_string(),
            RuntimeType::Podman => "Podman".to_string(),
        };

        Ok(RuntimeMetadata {
            name,
            version: info.server_version.unwrap_or_default(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self
            .client
            .create_image(Some(opts), None, auth.map(credentials));
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| map_image_pull_error(e, &image_name))?;
            if let Some(detail) = info.error_detail {
                return Err(ImageError::PullFailed(format!(
                    "{}: {}",
                    image_name,
                    detail.message.unwrap_or_default()
                )));
            }
        }

        Ok(())
    }

    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let image_name = reference.to_string();

        match self.client.inspect_image(&image_name).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to inspect {}: {}",
                image_name, e
            ))),
        }
    }

    async fn build_image<'a>(
        &'a self,
        request: &BuildRequest,
        auth: Option<&RegistryAuth>,
    ) -> Result<BuildStream<'a>, ImageError> {
        let context = recipe_context(&request.recipe)
            .map_err(|e| ImageError::Runtime(format!("failed to pack build context: {}", e)))?;

        let options = BuildImageOptions {
            dockerfile: RECIPE_FILE.to_string(),
            t: Some(request.tag.to_string()),
            rm: request.options.force_remove_intermediate,
            forcerm: request.options.force_remove_intermediate,
            nocache: request.options.no_cache,
            ..Default::default()
        };

        let registry_config = auth.map(|a| {
            let mut map = HashMap::new();
            map.insert(a.server_address().to_string(), credentials(a));
            map
        });

        let body = Either::Left(Full::new(Bytes::from(context)));
        let stream = self
            .client
            .build_image(options, registry_config, Some(body));

        let mapped = stream.filter_map(|result| async move {
            match result {
                Ok(info) => {
                    if let Some(detail) = info.error_detail {
                        let message = detail
                            .message
                            .unwrap_or_else(|| "build failed without a message".to_string());
                        return Some(Err(ImageError::BuildFailed(message)));
                    }
                    if let Some(id) = info.aux.and_then(|aux| aux.id) {
                        return Some(Ok(BuildProgress::Built(ImageId::new(id))));
                    }
                    if let Some(text) = info.stream {
                        return Some(Ok(BuildProgress::Output(text)));
                    }
                    info.status.map(|status| Ok(BuildProgress::Status(status)))
                }
                Err(e) => Some(Err(map_build_error(e))),
            }
        });

        Ok(Box::pin(mapped))
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let env: Vec<String> = config
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let container_config = ContainerCreateBody {
            image: Some(config.image.to_string()),
            env: if env.is_empty() { None } else { Some(env) },
            labels: if config.labels.is_empty() {
                None
            } else {
                Some(config.labels.clone())
            },
            cmd: config.command.clone(),
            entrypoint: config.entrypoint.clone(),
            user: config.user.clone(),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(config.name.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), container_config)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn upload_file(&self, id: &ContainerId, file: &FileUpload) -> Result<(), ContainerError> {
        let archive = build_file_archive(file).map_err(|e| ContainerError::UploadFailed {
            path: file.path.clone(),
            message: e.to_string(),
        })?;

        let opts = UploadToContainerOptions {
            path: "/".to_string(),
            ..Default::default()
        };

        self.client
            .upload_to_container(
                id.as_str(),
                Some(opts),
                Either::Left(Full::new(Bytes::from(archive))),
            )
            .await
            .map_err(|e| match map_container_not_found_error(e) {
                ContainerError::Runtime(message) => ContainerError::UploadFailed {
                    path: file.path.clone(),
                    message,
                },
                other => other,
            })
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        let mut stream = self
            .client
            .wait_container(id.as_str(), None::<WaitContainerOptions>);

        let mut exit_code = 0;
        while let Some(result) = stream.next().await {
            match result {
                Ok(response) => exit_code = response.status_code,
                // bollard reports non-zero exits as an error carrying the code
                Err(bollard::errors::Error::DockerContainerWaitError { code, .. }) => {
                    exit_code = code;
                }
                Err(e) => return Err(map_container_not_found_error(e)),
            }
        }

        Ok(exit_code)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();

        if let Some(ref name) = filters.name {
            filter_map.insert("name".to_string(), vec![name.clone()]);
        }

        for (key, value) in &filters.labels {
            filter_map
                .entry("label".to_string())
                .or_default()
                .push(format!("{}={}", key, value));
        }

        let opts = ListContainersOptions {
            all: filters.all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let name = c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();

                ContainerSummary {
                    id: ContainerId::new(c.id.unwrap_or_default()),
                    name,
                    image: c.image.unwrap_or_default(),
                    state: c
                        .state
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_default(),
                    labels: c.labels.unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLines, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: opts.follow,
            tail: opts
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream, data) = match output {
                        bollard::container::LogOutput::StdErr { message } => {
                            (LogStream::Stderr, message)
                        }
                        bollard::container::LogOutput::StdOut { message }
                        | bollard::container::LogOutput::StdIn { message }
                        | bollard::container::LogOutput::Console { message } => {
                            (LogStream::Stdout, message)
                        }
                    };

                    LogLine {
                        content: String::from_utf8_lossy(&data).into_owned(),
                        stream,
                    }
                })
                .map_err(|e| match e {
                    bollard::errors::Error::DockerResponseServerError {
                        status_code: 404,
                        message,
                    } => LogError::ContainerNotFound(message),
                    other => LogError::StreamError(other.to_string()),
                })
        });

        Ok(Box::pin(mapped_stream))
    }
}
