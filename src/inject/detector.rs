// ABOUTME: Runs the OS probe inside a throwaway container built from the source image.
// ABOUTME: Cleans up stale probe containers first and always removes its own afterwards.

use futures::StreamExt;
use sha2::{Digest, Sha256};

use super::error::InjectError;
use super::probe::{DetectionResult, PROBE_PATH, PROBE_SCRIPT, parse_probe_line};
use crate::config::PullPolicy;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::{
    ContainerConfig, ContainerEngine, ContainerError, ContainerFilters, ContainerOps, FileUpload,
    ImageOps, LogOps, LogOptions, LogStream, RegistryAuth,
};
use crate::types::{ContainerId, ImageRef};

/// Label put on every probe container.
pub const PROBE_LABEL: &str = "pinject.probe";

const NAME_PREFIX: &str = "pinject-";
const NAME_HASH_LEN: usize = 11;

/// How the detector gets hold of the source image.
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    pub pull: PullPolicy,
    pub auth: Option<RegistryAuth>,
}

/// Deterministic probe container name for an image.
///
/// The same image always maps to the same name, so a container left behind by
/// a crashed run is found and removed by the next one.
pub fn container_name(image: &ImageRef) -> String {
    let digest = Sha256::digest(image.to_string().as_bytes());
    let hex = format!("{:x}", digest);
    format!("{}{}", NAME_PREFIX, &hex[..NAME_HASH_LEN])
}

/// Probe the OS of `image`.
///
/// Returns `Ok(None)` when the probe printed nothing usable. Engine failures up
/// to and including the log stream abort with `InjectError::Transport`; problems
/// after that are recorded in `diagnostics`.
pub async fn detect_os<R: ContainerEngine>(
    runtime: &R,
    image: &ImageRef,
    options: &DetectOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Option<DetectionResult>, InjectError> {
    let name = container_name(image);

    remove_stale(runtime, &name).await?;
    ensure_image(runtime, image, options).await?;

    let config = probe_container_config(&name, image);
    let container_id = runtime.create_container(&config).await?;
    tracing::debug!(container = %container_id.short(), %name, "created probe container");

    let outcome = run_probe(runtime, &container_id, diagnostics).await;

    if let Err(e) = runtime.remove_container(&container_id, true).await {
        diagnostics.warn(Warning::container_cleanup(format!(
            "failed to remove probe container {}: {}",
            name, e
        )));
    }

    let Some(line) = outcome? else {
        return Ok(None);
    };

    match parse_probe_line(&line) {
        Ok(result) => {
            tracing::debug!(%result, "probe finished");
            Ok(Some(result))
        }
        Err(e) => {
            diagnostics.warn(Warning::malformed_probe_output(e.to_string()));
            Ok(None)
        }
    }
}

/// Remove every container, running or not, that carries the probe name.
async fn remove_stale<R: ContainerOps>(runtime: &R, name: &str) -> Result<(), InjectError> {
    let filters = ContainerFilters {
        name: Some(name.to_string()),
        all: true,
        ..Default::default()
    };

    // The engine's name filter matches substrings.
    let stale = runtime.list_containers(&filters).await?;
    for container in stale.into_iter().filter(|c| c.name == name) {
        tracing::debug!(container = %container.id.short(), %name, "removing stale probe container");
        match runtime.remove_container(&container.id, true).await {
            Ok(()) | Err(ContainerError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn ensure_image<R: ImageOps>(
    runtime: &R,
    image: &ImageRef,
    options: &DetectOptions,
) -> Result<(), InjectError> {
    let pull = match options.pull {
        PullPolicy::Always => true,
        PullPolicy::Missing => !runtime.image_exists(image).await?,
        PullPolicy::Never => false,
    };

    if pull {
        tracing::debug!(%image, "pulling source image");
        runtime.pull_image(image, options.auth.as_ref()).await?;
    }

    Ok(())
}

fn probe_container_config(name: &str, image: &ImageRef) -> ContainerConfig {
    let mut config = ContainerConfig::new(name, image.clone());
    config.entrypoint = Some(vec!["/bin/sh".to_string(), PROBE_PATH.to_string()]);
    config.command = Some(Vec::new());
    config
        .labels
        .insert(PROBE_LABEL.to_string(), "true".to_string());
    config
}

/// Upload, start and drain the probe. Returns the last non-empty stdout line.
async fn run_probe<R: ContainerOps + LogOps>(
    runtime: &R,
    id: &ContainerId,
    diagnostics: &mut Diagnostics,
) -> Result<Option<String>, InjectError> {
    let probe = FileUpload {
        path: PROBE_PATH.to_string(),
        content: PROBE_SCRIPT.as_bytes().to_vec(),
        mode: 0o755,
    };
    runtime.upload_file(id, &probe).await?;
    runtime.start_container(id).await?;

    let mut logs = runtime
        .container_logs(id, &LogOptions::follow_all())
        .await?;
    let mut capture = LineCapture::default();
    while let Some(line) = logs.next().await {
        let line = line?;
        capture.push(line.stream, &line.content);
    }
    let (stdout, stderr) = capture.finish();

    if let Some(stderr) = stderr {
        diagnostics.warn(Warning::probe_stderr(format!("probe stderr: {}", stderr)));
    }

    match runtime.wait_container(id).await {
        Ok(0) => {}
        Ok(code) => diagnostics.warn(Warning::probe_exit(format!(
            "probe exited with status {}",
            code
        ))),
        Err(e) => diagnostics.warn(Warning::probe_exit(format!(
            "probe exit status unavailable: {}",
            e
        ))),
    }

    Ok(stdout)
}

/// Splits log chunks into lines, remembering the last line of each stream.
#[derive(Debug, Default)]
struct LineCapture {
    stdout_partial: String,
    stderr_partial: String,
    last_stdout: Option<String>,
    last_stderr: Option<String>,
}

impl LineCapture {
    fn push(&mut self, stream: LogStream, chunk: &str) {
        let (partial, last) = match stream {
            LogStream::Stdout => (&mut self.stdout_partial, &mut self.last_stdout),
            LogStream::Stderr => (&mut self.stderr_partial, &mut self.last_stderr),
        };

        partial.push_str(chunk);
        while let Some(pos) = partial.find('\n') {
            let line: String = partial.drain(..=pos).collect();
            Self::keep(last, &line);
        }
    }

    fn finish(mut self) -> (Option<String>, Option<String>) {
        Self::keep(&mut self.last_stdout, &self.stdout_partial);
        Self::keep(&mut self.last_stderr, &self.stderr_partial);
        (self.last_stdout, self.last_stderr)
    }

    fn keep(last: &mut Option<String>, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            *last = Some(line.to_string());
        }
    }
}
