//! Dated CSV archives of price alert batches.
//!
//! An archive file holds one purge batch: a UTF-8 byte order mark, the
//! `date,productId,price` header, then one row per record.

mod error;
mod exporter;
mod format;

pub use error::{ArchiveError, ArchiveResult};
pub use exporter::{ArchiveExporter, ArchiveSummary};
pub use format::{format_price, format_timestamp};
