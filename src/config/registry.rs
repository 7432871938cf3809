// ABOUTME: Registry credentials from the config file or PINJECT_REGISTRY_* variables.
// ABOUTME: Used for pulling the source image and for base image access during builds.

use serde::Deserialize;

use super::EnvValue;
use crate::error::Result;
use crate::runtime::RegistryAuth;

pub const ENV_REGISTRY_USERNAME: &str = "PINJECT_REGISTRY_USERNAME";
pub const ENV_REGISTRY_PASSWORD: &str = "PINJECT_REGISTRY_PASSWORD";
pub const ENV_REGISTRY_SERVER: &str = "PINJECT_REGISTRY_SERVER";

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub server: Option<EnvValue>,
    pub username: EnvValue,
    pub password: EnvValue,
}

impl RegistryConfig {
    pub fn resolve(&self) -> Result<RegistryAuth> {
        Ok(RegistryAuth {
            username: self.username.resolve()?,
            password: self.password.resolve()?,
            server: self.server.as_ref().map(EnvValue::resolve).transpose()?,
        })
    }
}

/// Credentials from the environment; both username and password must be set.
pub fn registry_auth_from_env() -> Option<RegistryAuth> {
    let username = non_empty_var(ENV_REGISTRY_USERNAME)?;
    let password = non_empty_var(ENV_REGISTRY_PASSWORD)?;

    Some(RegistryAuth {
        username,
        password,
        server: non_empty_var(ENV_REGISTRY_SERVER),
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_literal_credentials() {
        let config: RegistryConfig =
            serde_yaml::from_str("server: ghcr.io\nusername: bot\npassword: hunter2").unwrap();

        let auth = config.resolve().unwrap();
        assert_eq!(auth.username, "bot");
        assert_eq!(auth.password, "hunter2");
        assert_eq!(auth.server.as_deref(), Some("ghcr.io"));
    }

    #[test]
    fn env_credentials_need_username_and_password() {
        temp_env::with_vars(
            [
                (ENV_REGISTRY_USERNAME, Some("bot")),
                (ENV_REGISTRY_PASSWORD, None),
                (ENV_REGISTRY_SERVER, None),
            ],
            || assert!(registry_auth_from_env().is_none()),
        );
    }

    #[test]
    fn env_credentials_default_to_docker_hub() {
        temp_env::with_vars(
            [
                (ENV_REGISTRY_USERNAME, Some("bot")),
                (ENV_REGISTRY_PASSWORD, Some("hunter2")),
                (ENV_REGISTRY_SERVER, None),
            ],
            || {
                let auth = registry_auth_from_env().unwrap();
                assert_eq!(auth.server, None);
                assert_eq!(auth.server_address(), crate::runtime::DOCKER_HUB_AUTH_SERVER);
            },
        );
    }
}
