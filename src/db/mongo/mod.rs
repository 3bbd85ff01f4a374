//! MongoDB backend.
//!
//! [`MongoConnector`] turns [`ConnectionParameters`] into driver options and
//! pings the configured database, so a bad address or credentials fail at
//! connect time rather than on the first query.

mod price_alerts;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{
    Client,
    bson::doc,
    options::{Acknowledgment, ClientOptions, Credential, WriteConcern},
};
pub use price_alerts::{MongoPriceAlertRepo, PriceAlertDocument, filter_document};

use super::{
    ConnectionParameters, Connector, DbError, DbResult, PriceAlertRepo, StoreConnection,
    WriteConcernLevel,
};

/// Opens a MongoDB client in direct-connection mode.
pub struct MongoConnector;

impl MongoConnector {
    /// Translate connection parameters into driver options.
    pub async fn client_options(params: &ConnectionParameters) -> DbResult<ClientOptions> {
        let mut options = ClientOptions::parse(&params.uri).await?;

        if let Some(credential) = &params.credential {
            options.credential = Some(
                Credential::builder()
                    .username(credential.username.clone())
                    .password(credential.password.clone())
                    .source(credential.source.clone())
                    .build(),
            );
        }

        options.direct_connection = Some(params.direct_connection);
        options.connect_timeout = Some(params.connect_timeout);
        options.server_selection_timeout = Some(params.connect_timeout);

        if let Some(retry_writes) = params.retry_writes {
            options.retry_writes = Some(retry_writes);
        }

        if let Some(level) = params.write_concern {
            options.write_concern = Some(match level {
                WriteConcernLevel::Majority => {
                    WriteConcern::builder().w(Acknowledgment::Majority).build()
                }
            });
        }

        if let Some(replica_set) = &params.replica_set {
            options.repl_set_name = Some(replica_set.clone());
        }

        Ok(options)
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, params: &ConnectionParameters) -> DbResult<Arc<dyn StoreConnection>> {
        let options = Self::client_options(params).await?;
        let client = Client::with_options(options)?;

        // The driver connects lazily; force a round trip.
        client
            .database(&params.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                DbError::Connection(format!(
                    "ping to {} failed: {}",
                    params.redacted_uri(),
                    e
                ))
            })?;

        Ok(Arc::new(MongoConnection { client }))
    }
}

/// A connected MongoDB client.
pub struct MongoConnection {
    client: Client,
}

impl StoreConnection for MongoConnection {
    fn price_alerts(&self, database: &str) -> Arc<dyn PriceAlertRepo> {
        Arc::new(MongoPriceAlertRepo::new(&self.client.database(database)))
    }
}
