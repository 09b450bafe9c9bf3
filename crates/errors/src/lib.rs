#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for fixity
//!
//! This crate provides fine-grained error types organized by domain:
//! configuration, remote API access, chunk integrity, and queue lifecycle.
//! Every error funnels into the shared [`Error`] umbrella at crate
//! boundaries.

use std::borrow::Cow;

use thiserror::Error;

pub mod api;
pub mod config;
pub mod integrity;
pub mod queue;

// Re-export all error types at the root
pub use api::ApiError;
pub use config::ConfigError;
pub use integrity::IntegrityError;
pub use queue::QueueError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for fixity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Api(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Api(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Integrity(_) => {
                Some("The stored chunk data does not match its manifest; the job will be retried.")
            }
            _ => None,
        }
    }
}
