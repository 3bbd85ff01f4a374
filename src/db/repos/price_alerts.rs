use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
    db::error::DbResult,
    models::{PriceAlertFilter, PriceAlertRecord},
};

/// Collection holding live price alert events.
pub const PRICE_ALERT_COLLECTION: &str = "priceAlertHistory";

/// Records yielded one at a time as the backing cursor advances.
///
/// A failed item ends the read; items already yielded stay valid.
pub type PriceAlertStream = BoxStream<'static, DbResult<PriceAlertRecord>>;

#[async_trait]
pub trait PriceAlertRepo: Send + Sync {
    /// Open a cursor over every record matching the filter, without a page limit.
    async fn find(&self, filter: &PriceAlertFilter) -> DbResult<PriceAlertStream>;

    // ==================== Retention Operations ====================

    /// Delete every record matching the filter.
    ///
    /// Returns the number of records deleted.
    async fn delete_many(&self, filter: &PriceAlertFilter) -> DbResult<u64>;
}
