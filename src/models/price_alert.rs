use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price alert event read from the live store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlertRecord {
    /// When the alert fired
    pub date: DateTime<Utc>,
    /// Product the alert refers to (stored as `productId`)
    pub product_id: String,
    /// Price observed when the alert fired
    pub price: f64,
}

impl PriceAlertRecord {
    pub fn new(date: DateTime<Utc>, product_id: impl Into<String>, price: f64) -> Self {
        Self {
            date,
            product_id: product_id.into(),
            price,
        }
    }
}

/// Selection predicate shared by the read and the delete of one run.
///
/// Matches records whose `date` is strictly after `date_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceAlertFilter {
    pub date_after: DateTime<Utc>,
}

impl PriceAlertFilter {
    pub fn newer_than(cutoff: DateTime<Utc>) -> Self {
        Self { date_after: cutoff }
    }

    /// Evaluate the predicate against a record.
    pub fn matches(&self, record: &PriceAlertRecord) -> bool {
        record.date > self.date_after
    }
}
