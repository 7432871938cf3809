// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented pinject.yml template.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const TEMPLATE: &str = r#"# Container engine. Detected automatically when omitted.
# runtime: docker            # docker | podman
# socket: /var/run/docker.sock

# Per-request timeout of the engine client.
timeout: 5m

# When to pull the source image before probing it: always | missing | never
pull: always

# Rebuild every layer instead of reusing cached ones.
no_cache: true

# Registry credentials. Without this section PINJECT_REGISTRY_USERNAME,
# PINJECT_REGISTRY_PASSWORD and PINJECT_REGISTRY_SERVER are used.
# registry:
#   server: ghcr.io
#   username: bot
#   password: { env: REGISTRY_TOKEN }
"#;

/// Write the template into `dir`, returning the path written.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;

    Ok(config_path)
}
