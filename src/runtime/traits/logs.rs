// ABOUTME: Log operations trait for container engines.
// ABOUTME: Stream demultiplexed stdout/stderr chunks of a container.

use crate::types::ContainerId;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Log chunks in the order the engine delivers them.
pub type LogLines = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

/// Log streaming operations.
#[async_trait]
pub trait LogOps: Send + Sync {
    /// Stream logs from a container.
    async fn container_logs(&self, id: &ContainerId, opts: &LogOptions)
    -> Result<LogLines, LogError>;
}

/// Options for log streaming.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Keep the stream open until the container exits.
    pub follow: bool,
    /// Number of lines to show from the end (None = all).
    pub tail: Option<u64>,
}

impl LogOptions {
    /// Both streams from the beginning, followed until the container exits.
    pub fn follow_all() -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: true,
            tail: None,
        }
    }

    /// The last N lines of both streams, without following.
    pub fn tail(n: u64) -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: false,
            tail: Some(n),
        }
    }
}

/// A chunk of container output. Chunks are not guaranteed to be whole lines.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub content: String,
    pub stream: LogStream,
}

impl LogLine {
    pub fn stdout(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            stream: LogStream::Stdout,
        }
    }

    pub fn stderr(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            stream: LogStream::Stderr,
        }
    }
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
