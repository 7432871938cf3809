// ABOUTME: Diagnostics accumulator for non-fatal warnings during an injection.
// ABOUTME: Collects problems that do not stop the build but should reach the operator.

/// Collects non-fatal warnings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Take the collected warnings, leaving the accumulator empty.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn container_cleanup(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ContainerCleanup, message)
    }

    pub fn probe_stderr(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ProbeStderr, message)
    }

    pub fn probe_exit(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ProbeExit, message)
    }

    pub fn malformed_probe_output(message: impl Into<String>) -> Self {
        Self::new(WarningKind::MalformedProbeOutput, message)
    }

    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The detection container could not be removed and may be left behind.
    ContainerCleanup,
    /// The probe wrote to stderr.
    ProbeStderr,
    /// The probe exited with a non-zero status.
    ProbeExit,
    /// The probe printed a line that does not follow its output grammar.
    MalformedProbeOutput,
}
