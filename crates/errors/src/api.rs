//! Remote API error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The service answered with a status other than the one the call site
    /// expects. `detail` is either the service's own `reason suggestion`
    /// pair or the raw response when the body has no error envelope; the
    /// caller-supplied preamble is preserved verbatim.
    #[error("{preamble}: {detail}")]
    Classified { preamble: String, detail: String },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("unable to decode response body: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Wrap a transport-level failure (connection, timeout, TLS).
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

impl UserFacingError for ApiError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Transport { .. } => Some("Check network connectivity and the DDS API URL."),
            _ => None,
        }
    }
}
