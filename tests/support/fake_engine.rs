// ABOUTME: In-memory container engine that records every call it receives.
// ABOUTME: Scripts probe output, build events and failures for injection tests.

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use pinject::runtime::{
    BuildProgress, BuildRequest, BuildStream, ContainerConfig, ContainerError, ContainerFilters,
    ContainerOps, ContainerSummary, FileUpload, ImageError, ImageOps, LogError, LogLine, LogLines,
    LogOps, LogOptions, RegistryAuth,
};
use pinject::types::{ContainerId, ImageRef};
use std::collections::{HashMap, HashSet};

/// One call received by the fake engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListContainers { name: Option<String>, all: bool },
    RemoveContainer { id: String, force: bool },
    ImageExists(String),
    PullImage { image: String, authenticated: bool },
    CreateContainer { name: String },
    UploadFile { id: String, path: String },
    StartContainer(String),
    ContainerLogs(String),
    WaitContainer(String),
    BuildImage { tag: String },
}

/// How a scripted build ends.
#[derive(Debug, Clone)]
pub enum BuildScript {
    /// Stream these events, then end.
    Succeed(Vec<BuildProgress>),
    /// Stream these events, then report an engine build error.
    FailAfter(Vec<BuildProgress>, String),
    /// Refuse the submission outright.
    Reject(String),
}

#[derive(Debug)]
struct State {
    calls: Vec<Call>,
    containers: Vec<ContainerSummary>,
    next_id: u64,
    local_images: HashSet<String>,
    probe_output: Vec<LogLine>,
    exit_code: i64,
    fail_removal: bool,
    fail_create: Option<String>,
    fail_upload: Option<String>,
    fail_start: Option<String>,
    fail_logs: Option<String>,
    build: BuildScript,
    builds: Vec<BuildRequest>,
    uploads: Vec<FileUpload>,
    created: Vec<ContainerConfig>,
}

/// Fake engine. Containers live in memory; nothing runs.
#[derive(Debug)]
pub struct FakeEngine {
    state: Mutex<State>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                calls: Vec::new(),
                containers: Vec::new(),
                next_id: 1,
                local_images: HashSet::new(),
                probe_output: Vec::new(),
                exit_code: 0,
                fail_removal: false,
                fail_create: None,
                fail_upload: None,
                fail_start: None,
                fail_logs: None,
                build: BuildScript::Succeed(Vec::new()),
                builds: Vec::new(),
                uploads: Vec::new(),
                created: Vec::new(),
            }),
        }
    }
}

impl FakeEngine {
    /// An engine whose probe prints `line` on stdout.
    pub fn with_probe_line(line: &str) -> Self {
        let engine = Self::default();
        engine.push_probe_output(LogLine::stdout(format!("{line}\n")));
        engine
    }

    pub fn push_probe_output(&self, line: LogLine) {
        self.state.lock().probe_output.push(line);
    }

    pub fn set_exit_code(&self, code: i64) {
        self.state.lock().exit_code = code;
    }

    pub fn set_fail_removal(&self, fail: bool) {
        self.state.lock().fail_removal = fail;
    }

    pub fn set_fail_create(&self, message: &str) {
        self.state.lock().fail_create = Some(message.to_string());
    }

    pub fn set_fail_upload(&self, message: &str) {
        self.state.lock().fail_upload = Some(message.to_string());
    }

    pub fn set_fail_start(&self, message: &str) {
        self.state.lock().fail_start = Some(message.to_string());
    }

    /// End the log stream with an error after the scripted output.
    pub fn set_fail_logs(&self, message: &str) {
        self.state.lock().fail_logs = Some(message.to_string());
    }

    pub fn set_build(&self, script: BuildScript) {
        self.state.lock().build = script;
    }

    pub fn add_local_image(&self, image: &str) {
        self.state.lock().local_images.insert(image.to_string());
    }

    /// Pretend a container with `name` already exists.
    pub fn add_container(&self, name: &str) -> ContainerId {
        let mut state = self.state.lock();
        let id = next_container_id(&mut state);
        state.containers.push(ContainerSummary {
            id: id.clone(),
            name: name.to_string(),
            image: "leftover".to_string(),
            state: "exited".to_string(),
            labels: HashMap::new(),
        });
        id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn container_names(&self) -> Vec<String> {
        self.state
            .lock()
            .containers
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn builds(&self) -> Vec<BuildRequest> {
        self.state.lock().builds.clone()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.state.lock().uploads.clone()
    }

    pub fn created(&self) -> Vec<ContainerConfig> {
        self.state.lock().created.clone()
    }

    /// Position of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.state.lock().calls.iter().position(pred)
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

fn next_container_id(state: &mut State) -> ContainerId {
    let id = ContainerId::new(format!("{:064x}", state.next_id));
    state.next_id += 1;
    id
}

#[async_trait]
impl ImageOps for FakeEngine {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        self.record(Call::PullImage {
            image: reference.to_string(),
            authenticated: auth.is_some(),
        });
        self.state.lock().local_images.insert(reference.to_string());
        Ok(())
    }

    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        self.record(Call::ImageExists(reference.to_string()));
        Ok(self
            .state
            .lock()
            .local_images
            .contains(&reference.to_string()))
    }

    async fn build_image<'a>(
        &'a self,
        request: &BuildRequest,
        _auth: Option<&RegistryAuth>,
    ) -> Result<BuildStream<'a>, ImageError> {
        self.record(Call::BuildImage {
            tag: request.tag.to_string(),
        });

        let mut state = self.state.lock();
        state.builds.push(request.clone());

        let events: Vec<Result<BuildProgress, ImageError>> = match &state.build {
            BuildScript::Succeed(events) => events.iter().cloned().map(Ok).collect(),
            BuildScript::FailAfter(events, message) => events
                .iter()
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(ImageError::BuildFailed(message.clone()))))
                .collect(),
            BuildScript::Reject(message) => return Err(ImageError::Runtime(message.clone())),
        };

        Ok(Box::pin(stream::iter(events)))
    }
}

#[async_trait]
impl ContainerOps for FakeEngine {
    async fn create_container(&self, config: &ContainerConfig) -> Result<ContainerId, ContainerError> {
        self.record(Call::CreateContainer {
            name: config.name.clone(),
        });

        let mut state = self.state.lock();
        if let Some(message) = &state.fail_create {
            return Err(ContainerError::Runtime(message.clone()));
        }
        if state.containers.iter().any(|c| c.name == config.name) {
            return Err(ContainerError::AlreadyExists(config.name.clone()));
        }

        let id = next_container_id(&mut state);
        state.containers.push(ContainerSummary {
            id: id.clone(),
            name: config.name.clone(),
            image: config.image.to_string(),
            state: "created".to_string(),
            labels: config.labels.clone(),
        });
        state.created.push(config.clone());
        Ok(id)
    }

    async fn upload_file(&self, id: &ContainerId, file: &FileUpload) -> Result<(), ContainerError> {
        self.record(Call::UploadFile {
            id: id.to_string(),
            path: file.path.clone(),
        });
        let mut state = self.state.lock();
        if let Some(message) = &state.fail_upload {
            return Err(ContainerError::UploadFailed {
                path: file.path.clone(),
                message: message.clone(),
            });
        }
        state.uploads.push(file.clone());
        Ok(())
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.record(Call::StartContainer(id.to_string()));
        match &self.state.lock().fail_start {
            Some(message) => Err(ContainerError::Runtime(message.clone())),
            None => Ok(()),
        }
    }

    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        self.record(Call::WaitContainer(id.to_string()));
        Ok(self.state.lock().exit_code)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        self.record(Call::RemoveContainer {
            id: id.to_string(),
            force,
        });

        let mut state = self.state.lock();
        if state.fail_removal {
            return Err(ContainerError::Runtime("device or resource busy".to_string()));
        }

        let before = state.containers.len();
        state.containers.retain(|c| &c.id != id);
        if state.containers.len() == before {
            return Err(ContainerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        self.record(Call::ListContainers {
            name: filters.name.clone(),
            all: filters.all,
        });

        // Substring match, like the engine's name filter.
        Ok(self
            .state
            .lock()
            .containers
            .iter()
            .filter(|c| {
                filters
                    .name
                    .as_deref()
                    .is_none_or(|name| c.name.contains(name))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LogOps for FakeEngine {
    async fn container_logs(&self, id: &ContainerId, _opts: &LogOptions) -> Result<LogLines, LogError> {
        self.record(Call::ContainerLogs(id.to_string()));
        let state = self.state.lock();
        let mut lines: Vec<Result<LogLine, LogError>> =
            state.probe_output.iter().cloned().map(Ok).collect();
        if let Some(message) = &state.fail_logs {
            lines.push(Err(LogError::StreamError(message.clone())));
        }
        Ok(Box::pin(stream::iter(lines)))
    }
}
