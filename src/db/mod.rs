mod connection;
mod error;
#[cfg(feature = "database-mongodb")]
pub mod mongo;
pub mod repos;

#[cfg(test)]
pub mod tests;

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
pub use connection::*;
pub use error::{DbError, DbResult};
pub use repos::*;
use tokio::sync::{Mutex, OnceCell};

#[cfg(feature = "database-mongodb")]
use crate::config::DatabaseConfig;

/// Opens the underlying store connection.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a connection and confirm it is usable.
    ///
    /// The caller bounds this with `params.connect_timeout`.
    async fn connect(&self, params: &ConnectionParameters) -> DbResult<Arc<dyn StoreConnection>>;
}

/// A live connection to the store.
pub trait StoreConnection: Send + Sync {
    /// Price alert repository in the given database.
    fn price_alerts(&self, database: &str) -> Arc<dyn PriceAlertRepo>;
}

/// Database-scoped view of the shared connection.
#[derive(Clone)]
pub struct DatabaseHandle {
    name: String,
    price_alerts: Arc<dyn PriceAlertRepo>,
}

impl DatabaseHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_alerts(&self) -> Arc<dyn PriceAlertRepo> {
        Arc::clone(&self.price_alerts)
    }
}

/// Owner of the single store connection used by a process.
///
/// The connection is opened on first use. Concurrent first callers queue on
/// one connect attempt and all receive its result, success or failure. A
/// failed attempt leaves the handle unconnected, so a later call tries again;
/// there is no reconnect once connected.
pub struct StoreHandle {
    connector: Arc<dyn Connector>,
    params: ConnectionParameters,
    connection: OnceCell<Arc<dyn StoreConnection>>,
    /// Held for the duration of a connect attempt; keeps the last failure.
    connect_lock: Mutex<Option<DbError>>,
    failed_attempts: AtomicU64,
}

impl StoreHandle {
    pub fn new(connector: Arc<dyn Connector>, params: ConnectionParameters) -> Self {
        Self {
            connector,
            params,
            connection: OnceCell::new(),
            connect_lock: Mutex::new(None),
            failed_attempts: AtomicU64::new(0),
        }
    }

    /// Handle backed by the MongoDB driver.
    #[cfg(feature = "database-mongodb")]
    pub fn mongodb(config: &DatabaseConfig) -> Self {
        Self::new(
            Arc::new(mongo::MongoConnector),
            build_connection_parameters(config),
        )
    }

    pub fn parameters(&self) -> &ConnectionParameters {
        &self.params
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// The shared connection, opening it on first use.
    ///
    /// Callers that were waiting on a failed attempt get that attempt's error
    /// instead of starting another one.
    pub async fn connection(&self) -> DbResult<Arc<dyn StoreConnection>> {
        if let Some(connection) = self.connection.get() {
            return Ok(Arc::clone(connection));
        }

        let seen_failures = self.failed_attempts.load(Ordering::SeqCst);
        let mut last_failure = self.connect_lock.lock().await;

        if let Some(connection) = self.connection.get() {
            return Ok(Arc::clone(connection));
        }
        if self.failed_attempts.load(Ordering::SeqCst) != seen_failures
            && let Some(error) = last_failure.as_ref()
        {
            return Err(error.clone());
        }

        match self.connect().await {
            Ok(connection) => {
                *last_failure = None;
                let connection = self.connection.get_or_init(|| async { connection }).await;
                Ok(Arc::clone(connection))
            }
            Err(e) => {
                *last_failure = Some(e.clone());
                self.failed_attempts.fetch_add(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Database-scoped accessor over the shared connection.
    pub async fn database(&self) -> DbResult<DatabaseHandle> {
        let connection = self.connection().await?;
        Ok(DatabaseHandle {
            name: self.params.database.clone(),
            price_alerts: connection.price_alerts(&self.params.database),
        })
    }

    async fn connect(&self) -> DbResult<Arc<dyn StoreConnection>> {
        let timeout = self.params.connect_timeout;
        tracing::debug!(
            uri = %self.params.redacted_uri(),
            timeout_secs = timeout.as_secs_f64(),
            "Connecting to price alert store"
        );

        let connection = tokio::time::timeout(timeout, self.connector.connect(&self.params))
            .await
            .map_err(|_| DbError::ConnectTimeout(timeout))??;

        tracing::info!(
            uri = %self.params.redacted_uri(),
            database = %self.params.database,
            "Connected to price alert store"
        );

        Ok(connection)
    }
}
