#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for fixity
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (TOML, passed via `--config`)
//! - Environment variables (`USER_KEY`, `AGENT_KEY`, `DDS_API_URL`,
//!   `AMQP_URL`, `TASK_QUEUE_NAME`)
//!
//! The result is one immutable value passed into every component
//! constructor; nothing else in the workspace reads the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use url::Url;

use fixity_errors::{ConfigError, Error};
use fixity_types::Credentials;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// DDS API access configuration
///
/// All three fields are required; `validate` reports every absent one.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL of the DDS API, with protocol and version prefix.
    pub base_url: Option<String>,
    pub user_key: Option<String>,
    pub agent_key: Option<String>,
}

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Broker URL, carried for an external AMQP binding; the in-process
    /// queue ignores it.
    pub amqp_url: Option<String>,
    pub name: Option<String>,
    /// Deliveries a job gets before it is dead-lettered.
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: u32,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            amqp_url: None,
            name: None,
            max_deliveries: default_max_deliveries(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

// Default value functions for serde

fn default_max_deliveries() -> u32 {
    3
}

fn default_timeout() -> u64 {
    300 // large chunks over slow object storage
}

fn default_connect_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from an optional path or start from defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Ok(Self::default()),
        }
    }

    /// Merge with environment variables
    ///
    /// Environment values override file values. Variable names match the
    /// deployment surface: `USER_KEY`, `AGENT_KEY`, `DDS_API_URL`,
    /// `AMQP_URL`, `TASK_QUEUE_NAME`.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable contains a value that
    /// cannot be parsed into the expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(user_key) = std::env::var("USER_KEY") {
            self.api.user_key = Some(user_key);
        }

        if let Ok(agent_key) = std::env::var("AGENT_KEY") {
            self.api.agent_key = Some(agent_key);
        }

        if let Ok(base_url) = std::env::var("DDS_API_URL") {
            self.api.base_url = Some(base_url);
        }

        if let Ok(amqp_url) = std::env::var("AMQP_URL") {
            self.queue.amqp_url = Some(amqp_url);
        }

        if let Ok(name) = std::env::var("TASK_QUEUE_NAME") {
            self.queue.name = Some(name);
        }

        if let Ok(max) = std::env::var("FIXITY_MAX_DELIVERIES") {
            self.queue.max_deliveries =
                max.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "FIXITY_MAX_DELIVERIES".to_string(),
                    value: max,
                })?;
        }

        Ok(())
    }

    /// Check that every required field is present and well-formed,
    /// reporting ALL missing fields in one error rather than the first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingFields` naming every absent required
    /// field, or `ConfigError::InvalidValue` for a malformed base URL.
    pub fn validate(&self) -> Result<(), Error> {
        let mut missing = Vec::new();
        if self.api.user_key.is_none() {
            missing.push("user_key (USER_KEY)".to_string());
        }
        if self.api.agent_key.is_none() {
            missing.push("agent_key (AGENT_KEY)".to_string());
        }
        if self.api.base_url.is_none() {
            missing.push("base_url (DDS_API_URL)".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields { fields: missing }.into());
        }

        self.base_url()?;
        Ok(())
    }

    /// The credential pair for token issuance
    ///
    /// # Errors
    ///
    /// Returns an error naming whichever keys are absent.
    pub fn credentials(&self) -> Result<Credentials, Error> {
        let mut missing = Vec::new();
        if self.api.user_key.is_none() {
            missing.push("user_key (USER_KEY)".to_string());
        }
        if self.api.agent_key.is_none() {
            missing.push("agent_key (AGENT_KEY)".to_string());
        }
        match (&self.api.user_key, &self.api.agent_key) {
            (Some(user_key), Some(agent_key)) => Ok(Credentials {
                user_key: user_key.clone(),
                agent_key: agent_key.clone(),
            }),
            _ => Err(ConfigError::MissingFields { fields: missing }.into()),
        }
    }

    /// The parsed API base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is absent or does not parse.
    pub fn base_url(&self) -> Result<Url, Error> {
        let raw = self.api.base_url.as_ref().ok_or(ConfigError::MissingFields {
            fields: vec!["base_url (DDS_API_URL)".to_string()],
        })?;
        Url::parse(raw).map_err(|e| {
            ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: format!("{raw} ({e})"),
            }
            .into()
        })
    }

    /// HTTP request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }

    /// HTTP connect timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixity_errors::{ConfigError, Error};
    use std::io::Write;

    fn full_config() -> Config {
        Config {
            api: ApiConfig {
                base_url: Some("https://dds.example.com/api/v1".to_string()),
                user_key: Some("uk".to_string()),
                agent_key: Some("ak".to_string()),
            },
            ..Config::default()
        }
    }

    #[test]
    fn validate_reports_all_missing_fields_at_once() {
        let err = Config::default().validate().unwrap_err();
        match err {
            Error::Config(ConfigError::MissingFields { fields }) => {
                assert_eq!(fields.len(), 3);
                assert!(fields.iter().any(|f| f.contains("user_key")));
                assert!(fields.iter().any(|f| f.contains("agent_key")));
                assert!(fields.iter().any(|f| f.contains("base_url")));
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_full_config() {
        full_config().validate().unwrap();
    }

    #[test]
    fn validate_rejects_unparseable_base_url() {
        let mut config = full_config();
        config.api.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_fill_in_tunables() {
        let config = Config::default();
        assert_eq!(config.queue.max_deliveries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn load_from_file_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[api]
base_url = "https://dds.example.com/api/v1"
user_key = "uk"
agent_key = "ak"

[queue]
name = "md5"
max_deliveries = 5
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.queue.name.as_deref(), Some("md5"));
        assert_eq!(config.queue.max_deliveries, 5);
        assert_eq!(config.credentials().unwrap().user_key, "uk");
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://dds.example.com/api/v1"
        );
    }

    // env access is process-global, so everything env-related lives in one
    // test to keep parallel test threads from racing
    #[test]
    fn merge_env_overrides_file_values_under_original_names() {
        let mut config = full_config();
        config.queue.amqp_url = Some("amqp://file-host".to_string());
        config.queue.name = Some("file-queue".to_string());

        std::env::set_var("USER_KEY", "env-uk");
        std::env::set_var("AGENT_KEY", "env-ak");
        std::env::set_var("DDS_API_URL", "https://env.example.com/api/v1");
        std::env::set_var("AMQP_URL", "amqp://env-host");
        std::env::set_var("TASK_QUEUE_NAME", "env-queue");
        std::env::set_var("FIXITY_MAX_DELIVERIES", "7");

        config.merge_env().unwrap();

        assert_eq!(config.api.user_key.as_deref(), Some("env-uk"));
        assert_eq!(config.api.agent_key.as_deref(), Some("env-ak"));
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://env.example.com/api/v1")
        );
        assert_eq!(config.queue.amqp_url.as_deref(), Some("amqp://env-host"));
        assert_eq!(config.queue.name.as_deref(), Some("env-queue"));
        assert_eq!(config.queue.max_deliveries, 7);

        std::env::set_var("FIXITY_MAX_DELIVERIES", "lots");
        let err = config.merge_env().unwrap_err();
        match err {
            Error::Config(ConfigError::InvalidValue { field, value }) => {
                assert_eq!(field, "FIXITY_MAX_DELIVERIES");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        for var in [
            "USER_KEY",
            "AGENT_KEY",
            "DDS_API_URL",
            "AMQP_URL",
            "TASK_QUEUE_NAME",
            "FIXITY_MAX_DELIVERIES",
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn load_from_missing_file_is_an_error() {
        let err = Config::load_from_file(Path::new("/nonexistent/fixity.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }
}
