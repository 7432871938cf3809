// ABOUTME: Configuration types and parsing for pinject.yml.
// ABOUTME: Engine connection, pull policy, build cache and registry credentials.

mod env_value;
mod init;
mod pull_policy;
mod registry;

pub use env_value::EnvValue;
pub use init::init_config;
pub use pull_policy::PullPolicy;
pub use registry::{
    ENV_REGISTRY_PASSWORD, ENV_REGISTRY_SERVER, ENV_REGISTRY_USERNAME, RegistryConfig,
    registry_auth_from_env,
};

use crate::error::{Error, Result};
use crate::inject::InjectOptions;
use crate::runtime::{BuildOptions, DEFAULT_TIMEOUT, RegistryAuth, RuntimeConfig, RuntimeType};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "pinject.yml";
pub const CONFIG_FILENAME_ALT: &str = "pinject.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".pinject/config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub socket: Option<String>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default)]
    pub pull: PullPolicy,

    #[serde(default = "default_no_cache")]
    pub no_cache: bool,

    #[serde(default)]
    pub registry: Option<RegistryConfig>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_no_cache() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime: None,
            socket: None,
            timeout: default_timeout(),
            pull: PullPolicy::default(),
            no_cache: default_no_cache(),
            registry: None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like `discover`, but a missing file means defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".to_string()));
        }
        if self.socket.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(Error::InvalidConfig("socket cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Engine connection settings.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            socket: self.socket.clone(),
            timeout: self.timeout,
        }
    }

    /// Registry credentials: the `registry` section wins, then the environment.
    pub fn registry_auth(&self) -> Result<Option<RegistryAuth>> {
        match &self.registry {
            Some(registry) => registry.resolve().map(Some),
            None => Ok(registry_auth_from_env()),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            no_cache: self.no_cache,
            ..BuildOptions::default()
        }
    }

    pub fn inject_options(&self) -> Result<InjectOptions> {
        Ok(InjectOptions {
            pull: self.pull,
            auth: self.registry_auth()?,
            build: self.build_options(),
        })
    }
}
