//! Archive-then-purge job for the `priceAlertHistory` collection.
//!
//! A run reads every price alert newer than `now - window`, writes them to a
//! dated CSV file, then deletes them from the store with the same filter.

pub mod archive;
pub mod config;
pub mod db;
pub mod models;
#[cfg(feature = "cli")]
pub mod observability;
pub mod retention;

#[cfg(test)]
mod tests;
