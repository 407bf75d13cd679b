//! Error types for buildbot.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for buildbot operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that abort a buildbot invocation.
#[derive(Error, Debug)]
pub enum BotError {
    /// The properties argument is not a valid JSON object.
    #[error("Failed to parse properties: {0}")]
    ParseProperties(#[from] serde_json::Error),

    /// A property needed by the current command is missing.
    #[error("Missing required property: {0}")]
    MissingProperty(&'static str),

    /// A property read by the current command has the wrong type.
    #[error("Property {key} must be {expected}")]
    InvalidProperty {
        key: &'static str,
        expected: &'static str,
    },

    /// Failed to parse buildbot.toml.
    #[error("Failed to parse config file: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// A filesystem operation failed.
    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process could not be started at all.
    #[error("Could not execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and did not exit successfully.
    #[error("Command '{command}' failed: {status}")]
    CommandFailed { command: String, status: String },
}

impl BotError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BotError::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
