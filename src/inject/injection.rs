// ABOUTME: Generic injection struct parameterized by state marker, with its transitions.
// ABOUTME: Each transition consumes the previous state so steps cannot be skipped or repeated.

use super::builder;
use super::detector::{self, DetectOptions};
use super::distro::{self, UpdatePlan};
use super::error::InjectError;
use super::probe::DetectionResult;
use super::recipe::BuildRecipe;
use super::state::{Built, Detected, Idle, Resolved};
use crate::config::PullPolicy;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::{BuildOptions, BuildProgress, BuildRequest, ContainerEngine, RegistryAuth};
use crate::types::{ImageId, ImageRef};

/// Knobs for one injection.
#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    pub pull: PullPolicy,
    pub auth: Option<RegistryAuth>,
    pub build: BuildOptions,
}

/// An injection in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Injection<S> {
    pub(crate) source: ImageRef,
    pub(crate) tag: ImageRef,
    pub(crate) options: InjectOptions,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) state: S,
}

/// What a finished injection produced.
#[derive(Debug, Clone)]
pub struct InjectReport {
    pub source: ImageRef,
    pub tag: ImageRef,
    pub detection: DetectionResult,
    pub plan: UpdatePlan,
    pub image_id: Option<ImageId>,
    pub warnings: Vec<Warning>,
}

impl<S> Injection<S> {
    pub fn source(&self) -> &ImageRef {
        &self.source
    }

    pub fn tag(&self) -> &ImageRef {
        &self.tag
    }

    pub fn options(&self) -> &InjectOptions {
        &self.options
    }

    /// Warnings recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn transition<T>(self, state: T) -> Injection<T> {
        Injection {
            source: self.source,
            tag: self.tag,
            options: self.options,
            diagnostics: self.diagnostics,
            state,
        }
    }
}

// =============================================================================
// Idle -> Detected
// =============================================================================

impl Injection<Idle> {
    pub fn new(source: ImageRef, tag: ImageRef, options: InjectOptions) -> Self {
        Injection {
            source,
            tag,
            options,
            diagnostics: Diagnostics::default(),
            state: Idle,
        }
    }

    /// Run the probe against the source image.
    ///
    /// # Errors
    ///
    /// `UnsupportedDistribution("cannot detect OS")` when the probe gave no
    /// usable answer, `Transport` when the engine failed.
    #[must_use = "injection state must be used"]
    pub async fn detect<R: ContainerEngine>(
        mut self,
        runtime: &R,
    ) -> Result<Injection<Detected>, InjectError> {
        let detect_options = DetectOptions {
            pull: self.options.pull,
            auth: self.options.auth.clone(),
        };

        let detection =
            detector::detect_os(runtime, &self.source, &detect_options, &mut self.diagnostics)
                .await?
                .ok_or_else(InjectError::cannot_detect)?;

        Ok(self.transition(Detected { detection }))
    }
}

// =============================================================================
// Detected -> Resolved
// =============================================================================

impl Injection<Detected> {
    pub fn detection(&self) -> &DetectionResult {
        &self.state.detection
    }

    /// Look up the update commands for the detected distribution.
    ///
    /// # Errors
    ///
    /// `UnsupportedDistribution` naming the distro and version when no rule matches.
    pub fn resolve(self) -> Result<Injection<Resolved>, InjectError> {
        let detection = self.state.detection.clone();
        let plan = distro::resolve(&detection.distro, &detection.version)
            .ok_or_else(|| InjectError::unsupported(&detection.distro, &detection.version))?;

        tracing::debug!(%detection, %plan, "resolved update plan");
        Ok(self.transition(Resolved { detection, plan }))
    }
}

// =============================================================================
// Resolved -> Built
// =============================================================================

impl Injection<Resolved> {
    pub fn detection(&self) -> &DetectionResult {
        &self.state.detection
    }

    pub fn plan(&self) -> &UpdatePlan {
        &self.state.plan
    }

    /// Render the recipe that would be built.
    pub fn recipe(&self) -> Result<BuildRecipe, InjectError> {
        Ok(BuildRecipe::render(
            &self.source.to_string(),
            &self.state.plan.joined(),
            &self.state.detection.user,
        )?)
    }

    /// Build the recipe into `tag`, relaying progress to `on_progress`.
    ///
    /// # Errors
    ///
    /// `BuildFailed` for engine-reported build errors, `Transport` otherwise.
    #[must_use = "injection state must be used"]
    pub async fn build<R, F>(
        self,
        runtime: &R,
        on_progress: F,
    ) -> Result<Injection<Built>, InjectError>
    where
        R: ContainerEngine,
        F: FnMut(&BuildProgress),
    {
        let request = BuildRequest {
            recipe: self.recipe()?.into_string(),
            tag: self.tag.clone(),
            options: self.options.build,
        };

        let image_id =
            builder::build_image(runtime, &request, self.options.auth.as_ref(), on_progress)
                .await?;

        let Resolved { detection, plan } = self.state.clone();
        Ok(self.transition(Built {
            detection,
            plan,
            image_id,
        }))
    }
}

// =============================================================================
// Built -> report
// =============================================================================

impl Injection<Built> {
    pub fn image_id(&self) -> Option<&ImageId> {
        self.state.image_id.as_ref()
    }

    pub fn finish(self) -> InjectReport {
        InjectReport {
            source: self.source,
            tag: self.tag,
            detection: self.state.detection,
            plan: self.state.plan,
            image_id: self.state.image_id,
            warnings: self.diagnostics.into_warnings(),
        }
    }
}
