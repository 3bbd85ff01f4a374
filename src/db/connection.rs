//! Connection parameters derived from static configuration.
//!
//! [`build_connection_parameters`] is pure: it performs no I/O and the same
//! configuration always yields the same parameters. Drivers translate the
//! result into their own option types at connect time.

use std::{fmt, time::Duration};

use crate::config::DatabaseConfig;

/// Everything a [`Connector`](super::Connector) needs to open the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionParameters {
    /// Seed URI, `mongodb://<host>:<port>/`.
    pub uri: String,
    /// Database the archiver works in.
    pub database: String,
    /// Credentials, when a user is configured.
    pub credential: Option<StoreCredential>,
    /// Connect to the seed host only, without topology discovery.
    pub direct_connection: bool,
    pub retry_writes: Option<bool>,
    pub write_concern: Option<WriteConcernLevel>,
    pub replica_set: Option<String>,
    /// Upper bound for establishing the connection.
    pub connect_timeout: Duration,
}

impl ConnectionParameters {
    /// The URI with credentials spelled out as they would be sent, password masked.
    pub fn redacted_uri(&self) -> String {
        match &self.credential {
            Some(credential) => {
                let rest = self
                    .uri
                    .strip_prefix("mongodb://")
                    .unwrap_or(self.uri.as_str());
                format!(
                    "mongodb://{}:****@{}?authSource={}",
                    credential.username, rest, credential.source
                )
            }
            None => self.uri.clone(),
        }
    }
}

/// Username/password scoped to an authentication database.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredential {
    pub username: String,
    pub password: String,
    /// Authentication database.
    pub source: String,
}

impl fmt::Debug for StoreCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredential")
            .field("username", &self.username)
            .field("password", &"****")
            .field("source", &self.source)
            .finish()
    }
}

/// Recognized write concern levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConcernLevel {
    /// Acknowledged by a majority of voting members.
    Majority,
}

impl WriteConcernLevel {
    /// Parse a configured value. Returns `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "majority" => Some(WriteConcernLevel::Majority),
            _ => None,
        }
    }
}

/// Build connection parameters from the database configuration.
pub fn build_connection_parameters(config: &DatabaseConfig) -> ConnectionParameters {
    let credential = (!config.user.is_empty()).then(|| StoreCredential {
        username: config.user.clone(),
        password: config.pass.clone(),
        source: config.name.clone(),
    });

    let mut params = ConnectionParameters {
        uri: format!("mongodb://{}:{}/", config.host, config.port),
        database: config.name.clone(),
        credential,
        direct_connection: true,
        retry_writes: None,
        write_concern: None,
        replica_set: None,
        connect_timeout: config.connect_timeout(),
    };

    if let Some(options) = &config.options {
        params.retry_writes = options.retry_writes;

        if let Some(value) = &options.write_concern {
            params.write_concern = WriteConcernLevel::parse(value);
            if params.write_concern.is_none() {
                tracing::warn!(
                    write_concern = %value,
                    "Unrecognized write concern in database.options, using the server default"
                );
            }
        }

        params.replica_set = options.replica_set.clone();
    }

    params
}
