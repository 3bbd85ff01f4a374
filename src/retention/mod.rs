//! Archive-then-purge of recent price alerts.
//!
//! Each run:
//! 1. Computes `cutoff = now - retention.window_hours`
//! 2. Reads every price alert strictly after the cutoff
//! 3. Writes them to the dated CSV archive
//! 4. Deletes them with the same filter
//!
//! Nothing is deleted unless the archive was written and the read completed.
//! A read that fails partway still archives the records already fetched but
//! skips the delete (`DeleteOutcome::SkippedPartialRead`, `read_complete =
//! false`). Deleting with the cutoff filter at that point would also remove
//! records the archive never saw, so the archived subset stays in the store
//! and is archived again by the next run. Dry-run mode stops after step 3.

mod coordinator;

pub use coordinator::{DeleteOutcome, PurgeCoordinator, PurgeError, PurgeReport};
