// ABOUTME: Detect command implementation.
// ABOUTME: Probes an image and prints its distribution, version and user.

use super::parse_image;
use super::runtime_connection::connect_to_runtime;
use pinject::config::Config;
use pinject::diagnostics::Diagnostics;
use pinject::error::Result;
use pinject::inject::{DetectOptions, InjectError, detect_os, resolve};
use pinject::output::Output;

/// Print `distro/version:user` for `source`, and whether it can be patched.
pub async fn detect(config: &Config, source: &str, mut output: Output) -> Result<()> {
    let source = parse_image(source)?;
    let options = DetectOptions {
        pull: config.pull,
        auth: config.registry_auth()?,
    };

    output.start_timer();
    let runtime = connect_to_runtime(config, &output).await?;

    let mut diag = Diagnostics::default();
    let detection = detect_os(&runtime, &source, &options, &mut diag).await?;

    for warning in diag.warnings() {
        output.warning(warning);
    }

    let detection = detection.ok_or_else(InjectError::cannot_detect)?;
    output.result("detection", &detection.to_string());

    match resolve(&detection.distro, &detection.version) {
        Some(plan) => output.progress(&format!("  → Update commands: {}", plan)),
        None => output.progress("  → No update commands for this distribution"),
    }

    Ok(())
}
