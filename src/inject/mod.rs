// ABOUTME: Image injection: detect the source OS, pick update commands, build a patched image.
// ABOUTME: Exports the type state Injection and the one-call inject_build entry point.

mod builder;
mod detector;
mod distro;
mod error;
mod injection;
mod probe;
mod recipe;
mod state;

pub use builder::build_image;
pub use detector::{DetectOptions, PROBE_LABEL, container_name, detect_os};
pub use distro::{UpdatePlan, resolve};
pub use error::{InjectError, InjectErrorKind};
pub use injection::{InjectOptions, InjectReport, Injection};
pub use probe::{DetectionResult, PROBE_PATH, PROBE_SCRIPT, ProbeLineError, parse_probe_line};
pub use recipe::{BuildRecipe, RecipeError};
pub use state::{Built, Detected, Idle, Resolved};

pub use crate::config::PullPolicy;

use crate::runtime::{BuildProgress, ContainerEngine};
use crate::types::ImageRef;

/// Detect, resolve, render and build in one go.
///
/// Produces `tag` from `source` with the distribution's update commands
/// applied as root. Progress events reach `on_progress` as the engine sends them.
pub async fn inject_build<R, F>(
    runtime: &R,
    source: ImageRef,
    tag: ImageRef,
    options: InjectOptions,
    on_progress: F,
) -> Result<InjectReport, InjectError>
where
    R: ContainerEngine,
    F: FnMut(&BuildProgress),
{
    let built = Injection::new(source, tag, options)
        .detect(runtime)
        .await?
        .resolve()?
        .build(runtime, on_progress)
        .await?;

    Ok(built.finish())
}
