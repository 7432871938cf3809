// ABOUTME: Image pull policy for the detection container's source image.
// ABOUTME: Supports always, missing and never.

use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPolicy {
    /// Pull before every detection, with registry credentials when configured.
    #[default]
    Always,
    /// Pull only when the engine does not already have the image.
    Missing,
    /// Use whatever the engine has locally.
    Never,
}

impl FromStr for PullPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(PullPolicy::Always),
            "missing" | "if-not-present" => Ok(PullPolicy::Missing),
            "never" => Ok(PullPolicy::Never),
            _ => Err(format!("unknown pull policy: {}", s)),
        }
    }
}

impl fmt::Display for PullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullPolicy::Always => write!(f, "always"),
            PullPolicy::Missing => write!(f, "missing"),
            PullPolicy::Never => write!(f, "never"),
        }
    }
}

impl<'de> Deserialize<'de> for PullPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
