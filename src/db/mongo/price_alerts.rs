use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Document, doc},
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{PRICE_ALERT_COLLECTION, PriceAlertRepo, PriceAlertStream},
    },
    models::{PriceAlertFilter, PriceAlertRecord},
};

/// Stored shape of a price alert. Missing `productId`/`price` decode to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlertDocument {
    pub date: bson::DateTime,
    #[serde(rename = "productId", default)]
    pub product_id: String,
    #[serde(default)]
    pub price: f64,
}

impl From<&PriceAlertRecord> for PriceAlertDocument {
    fn from(record: &PriceAlertRecord) -> Self {
        Self {
            date: bson::DateTime::from_millis(record.date.timestamp_millis()),
            product_id: record.product_id.clone(),
            price: record.price,
        }
    }
}

impl TryFrom<PriceAlertDocument> for PriceAlertRecord {
    type Error = DbError;

    fn try_from(document: PriceAlertDocument) -> DbResult<Self> {
        let millis = document.date.timestamp_millis();
        let date = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            DbError::Internal(format!("price alert date out of range: {millis}ms"))
        })?;
        Ok(PriceAlertRecord {
            date,
            product_id: document.product_id,
            price: document.price,
        })
    }
}

/// `{ date: { $gt: <cutoff> } }`, at the store's millisecond precision.
pub fn filter_document(filter: &PriceAlertFilter) -> Document {
    let cutoff = bson::DateTime::from_millis(filter.date_after.timestamp_millis());
    doc! { "date": { "$gt": cutoff } }
}

pub struct MongoPriceAlertRepo {
    collection: Collection<PriceAlertDocument>,
}

impl MongoPriceAlertRepo {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(PRICE_ALERT_COLLECTION),
        }
    }
}

#[async_trait]
impl PriceAlertRepo for MongoPriceAlertRepo {
    async fn find(&self, filter: &PriceAlertFilter) -> DbResult<PriceAlertStream> {
        let cursor = self.collection.find(filter_document(filter)).await?;

        Ok(cursor
            .map(|item| {
                item.map_err(DbError::from)
                    .and_then(PriceAlertRecord::try_from)
            })
            .boxed())
    }

    async fn delete_many(&self, filter: &PriceAlertFilter) -> DbResult<u64> {
        let result = self.collection.delete_many(filter_document(filter)).await?;
        Ok(result.deleted_count)
    }
}
