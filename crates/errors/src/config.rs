//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    /// All required fields absent from file, environment, and flags,
    /// reported in one pass rather than first-missing-wins.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Provide a configuration file with --config or rely on environment variables.")
            }
            Self::MissingFields { .. } => Some(
                "Set USER_KEY, AGENT_KEY, and DDS_API_URL (and AMQP_URL/TASK_QUEUE_NAME for queue use), or add them to the config file.",
            ),
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
        }
    }
}
