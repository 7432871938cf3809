// ABOUTME: Container image reference parsing and validation.
// ABOUTME: Accepts nginx, nginx:tag, registry:5000/org/app:tag and @digest forms.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Registry used when a reference names none.
pub const DEFAULT_REGISTRY: &str = "docker.io";

const MAX_TAG_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character {1:?} in image reference: {0}")]
    InvalidChar(String, char),

    #[error("repository must be lowercase: {0}")]
    UppercaseRepository(String),

    #[error("invalid tag {0:?}")]
    InvalidTag(String),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

/// A parsed `[registry/]repository[:tag][@digest]` reference.
///
/// References without a tag or digest get the `latest` tag, matching what the
/// engine would pull.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "/:.-_@".contains(*c)))
        {
            return Err(ParseImageRefError::InvalidChar(input.to_string(), c));
        }

        let (named, digest) = match input.split_once('@') {
            Some((named, digest)) if !digest.is_empty() => (named, Some(digest.to_string())),
            Some(_) => return Err(ParseImageRefError::InvalidFormat(input.to_string())),
            None => (input, None),
        };

        // A colon after the last slash starts the tag; earlier colons are registry ports.
        let last_slash = named.rfind('/').map_or(0, |i| i + 1);
        let (path, tag) = match named[last_slash..].find(':') {
            Some(offset) => {
                let split = last_slash + offset;
                (&named[..split], Some(named[split + 1..].to_string()))
            }
            None => (named, None),
        };

        if let Some(ref tag) = tag
            && !is_valid_tag(tag)
        {
            return Err(ParseImageRefError::InvalidTag(tag.clone()));
        }

        let (registry, repository) = split_registry(path);
        if repository.is_empty()
            || repository.starts_with('/')
            || repository.ends_with('/')
            || repository.contains("//")
        {
            return Err(ParseImageRefError::InvalidFormat(input.to_string()));
        }
        if repository.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ParseImageRefError::UppercaseRepository(
                repository.to_string(),
            ));
        }

        let tag = if tag.is_none() && digest.is_none() {
            Some("latest".to_string())
        } else {
            tag
        };

        Ok(Self {
            registry: registry.map(str::to_string),
            repository: repository.to_string(),
            tag,
            digest,
        })
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Registry host the reference resolves against.
    pub fn registry_host(&self) -> &str {
        self.registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

/// The first path component is a registry when it looks like a host.
fn split_registry(path: &str) -> (Option<&str>, &str) {
    match path.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (Some(first), rest)
        }
        _ => (None, path),
    }
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= MAX_TAG_LEN
        && !tag.starts_with(['.', '-'])
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

impl FromStr for ImageRef {
    type Err = ParseImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{registry}/")?;
        }
        f.write_str(&self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}
