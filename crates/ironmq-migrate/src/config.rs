//! Configuration types for ironmq-migrate.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default host of the v2 (source) service.
pub const DEFAULT_SOURCE_HOST: &str = "mq-aws-us-east-1.iron.io";

/// Default host of the v3 (destination) service.
pub const DEFAULT_DESTINATION_HOST: &str = "mq-aws-us-east-1-1.iron.io";

/// Main migration configuration.
///
/// Built once at startup and never mutated afterwards; the coordinator and
/// every worker only ever read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Source (v2) service connection.
    #[serde(default = "ConnectionSettings::source")]
    pub source: ConnectionSettings,
    /// Destination (v3) service connection.
    #[serde(default = "ConnectionSettings::destination")]
    pub destination: ConnectionSettings,
    /// Migration options.
    #[serde(default)]
    pub options: MigrationOptions,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source: ConnectionSettings::source(),
            destination: ConnectionSettings::destination(),
            options: MigrationOptions::default(),
        }
    }
}

/// Connection settings for one queue service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Service host name. Empty means "use the side's default host".
    #[serde(default)]
    pub host: String,
    /// Project identifier.
    #[serde(default)]
    pub project_id: String,
    /// OAuth token.
    #[serde(default)]
    pub token: String,
    /// URL scheme.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ConnectionSettings {
    /// Settings pointing at the default v2 endpoint, without credentials.
    #[must_use]
    pub fn source() -> Self {
        Self::with_host(DEFAULT_SOURCE_HOST)
    }

    /// Settings pointing at the default v3 endpoint, without credentials.
    #[must_use]
    pub fn destination() -> Self {
        Self::with_host(DEFAULT_DESTINATION_HOST)
    }

    fn with_host(host: &str) -> Self {
        Self {
            host: host.to_string(),
            project_id: String::new(),
            token: String::new(),
            scheme: default_scheme(),
            port: default_port(),
        }
    }

    /// Base URL of the project on this service for the given API version.
    ///
    /// e.g. `https://mq-aws-us-east-1.iron.io:443/1/projects/abc`
    #[must_use]
    pub fn base_url(&self, api_version: u8) -> String {
        format!(
            "{}://{}:{}/{}/projects/{}",
            self.scheme,
            self.host.trim_end_matches('/'),
            self.port,
            api_version,
            self.project_id
        )
    }

    fn has_credentials(&self) -> bool {
        !self.project_id.is_empty() && !self.token.is_empty()
    }
}

/// Migration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Number of queues migrated concurrently.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Copy queue metadata only, never messages.
    #[serde(default)]
    pub skip_messages: bool,
    /// Migrate only this queue instead of enumerating the source. An empty
    /// name means every queue.
    #[serde(default)]
    pub queue: Option<String>,
    /// Fetch and derive queue configuration without writing anything.
    #[serde(default)]
    pub dry_run: bool,
    /// Per-request HTTP timeout. `None` lets a hung call block its worker.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            skip_messages: false,
            queue: None,
            dry_run: false,
            request_timeout_secs: None,
        }
    }
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_threads() -> usize {
    1
}

impl MigrationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling in default hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content)?;
        if config.source.host.is_empty() {
            config.source.host = DEFAULT_SOURCE_HOST.to_string();
        }
        if config.destination.host.is_empty() {
            config.destination.host = DEFAULT_DESTINATION_HOST.to_string();
        }
        config.options.queue = config.options.queue.filter(|q| !q.is_empty());
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either side lacks credentials or no workers are
    /// configured.
    pub fn validate(&self) -> Result<()> {
        if !self.source.has_credentials() || !self.destination.has_credentials() {
            return Err(Error::Config(
                "v2 and v3 project ids and tokens are all required".to_string(),
            ));
        }
        if self.options.threads == 0 {
            return Err(Error::Config("threads must be at least 1".to_string()));
        }
        Ok(())
    }
}
