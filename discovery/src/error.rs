//! Error type for command discovery.

use std::time::Duration;

use command_alias_core::ValidationError;
use thiserror::Error;

/// Errors raised while probing a binary and building its command tree.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The command could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command did not exit in time and was killed.
    #[error("'{command}' timed out after {}ms", timeout.as_millis())]
    Timeout { command: String, timeout: Duration },

    /// The command printed nothing on either stream.
    #[error("'{command}' produced no help output")]
    EmptyOutput { command: String },

    /// Waiting on or reading from the child process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsed help could not be turned into a valid tree.
    #[error("invalid command tree: {0}")]
    Tree(#[from] ValidationError),

    /// The worker pool could not be created.
    #[error("failed to build probe thread pool: {0}")]
    ThreadPool(String),
}

/// Convenience alias for results with [`DiscoverError`].
pub type Result<T> = std::result::Result<T, DiscoverError>;
