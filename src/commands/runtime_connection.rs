// ABOUTME: Shared helper for connecting to the local container engine.
// ABOUTME: Resolves the endpoint, connects and checks the engine answers.

use pinject::config::Config;
use pinject::error::Result;
use pinject::output::Output;
use pinject::runtime::{self, BollardRuntime, RuntimeError, RuntimeInfoTrait};

/// Connect to the container engine described by `config`.
///
/// Pings the engine so an unreachable socket fails here rather than in the
/// middle of an injection.
pub async fn connect_to_runtime(config: &Config, output: &Output) -> Result<BollardRuntime> {
    let runtime = runtime::connect(&config.runtime_config())?;

    runtime.ping().await.map_err(RuntimeError::from)?;
    let info = runtime.info().await.map_err(RuntimeError::from)?;
    tracing::debug!(
        api_version = %info.api_version,
        os = %info.os,
        arch = %info.arch,
        "engine info"
    );
    output.progress(&format!(
        "  → Connected to {} {}",
        runtime.runtime_type(),
        info.version
    ));

    Ok(runtime)
}
