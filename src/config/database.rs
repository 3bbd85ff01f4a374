use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Connection settings for the MongoDB instance holding `priceAlertHistory`.
///
/// Credentials are scoped to the configured database (it doubles as the
/// authentication source).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Server host name or address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username. Leave empty to connect without authentication.
    #[serde(default)]
    pub user: String,

    /// Password for `user`.
    #[serde(default)]
    pub pass: String,

    /// Database name; also used as the authentication source.
    pub name: String,

    /// Optional driver tuning flags.
    #[serde(default)]
    pub options: Option<DatabaseOptions>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.host cannot be empty".into(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("database.port cannot be 0".into()));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.name cannot be empty".into(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "database.connect_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Connection timeout as a Duration.
    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Store-specific tuning flags. Each one is applied only when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseOptions {
    /// Whether the driver retries failed writes once.
    #[serde(default, alias = "retryWrites")]
    pub retry_writes: Option<bool>,

    /// Write concern. Only `"majority"` is recognized; other values are
    /// accepted and ignored with a warning.
    #[serde(default, alias = "writeConcern")]
    pub write_concern: Option<String>,

    /// Replica set name.
    #[serde(default, alias = "replicaSet")]
    pub replica_set: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    27017
}

fn default_connect_timeout() -> u64 {
    5
}
