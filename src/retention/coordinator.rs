//! Archive-then-purge run over the price alert collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use thiserror::Error;

use crate::{
    archive::{ArchiveError, ArchiveExporter, ArchiveSummary},
    config::RetentionConfig,
    db::{DbError, PriceAlertRepo, StoreHandle},
    models::{PriceAlertFilter, PriceAlertRecord},
};

/// Failures that abort a run before anything is deleted.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("Failed to connect to the price alert store: {0}")]
    Connect(#[source] DbError),

    #[error("Failed to write archive: {0}")]
    Archive(#[from] ArchiveError),
}

/// What happened to the delete step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing was read, so nothing was archived or deleted.
    NotAttempted,
    /// The delete ran and removed this many records.
    Deleted(u64),
    /// Dry run: archived only.
    SkippedDryRun,
    /// The read ended early; deleting would remove records missing from the archive.
    SkippedPartialRead,
    /// The delete was issued and failed. The archive is kept.
    Failed,
}

/// Results from a single purge run.
#[derive(Debug, Clone, PartialEq)]
pub struct PurgeReport {
    /// Records strictly after this instant were selected.
    pub cutoff: DateTime<Utc>,
    /// Number of records read.
    pub fetched: usize,
    /// False if the query or cursor failed.
    pub read_complete: bool,
    /// Archive written for this run, if any.
    pub archive: Option<ArchiveSummary>,
    pub delete: DeleteOutcome,
}

impl PurgeReport {
    /// Number of records deleted.
    pub fn deleted(&self) -> u64 {
        match self.delete {
            DeleteOutcome::Deleted(n) => n,
            _ => 0,
        }
    }

    /// True if the run found nothing to archive.
    pub fn is_noop(&self) -> bool {
        self.fetched == 0
    }
}

/// Runs one extract, archive, purge cycle.
///
/// The filter is built once per run and used for both the read and the
/// delete. The archive is fully written before the delete is issued.
pub struct PurgeCoordinator {
    store: Arc<StoreHandle>,
    exporter: ArchiveExporter,
    config: RetentionConfig,
}

impl PurgeCoordinator {
    pub fn new(store: Arc<StoreHandle>, exporter: ArchiveExporter, config: RetentionConfig) -> Self {
        Self {
            store,
            exporter,
            config,
        }
    }

    pub async fn run(&self) -> Result<PurgeReport, PurgeError> {
        self.run_at(Utc::now()).await
    }

    /// Run with a fixed clock.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<PurgeReport, PurgeError> {
        let cutoff = self.config.cutoff(now);
        let filter = PriceAlertFilter::newer_than(cutoff);

        let dry_run_msg = if self.config.dry_run {
            " (DRY RUN)"
        } else {
            ""
        };

        tracing::info!(
            cutoff = %cutoff,
            window_hours = self.config.window_hours,
            dry_run = self.config.dry_run,
            "Starting price alert purge{}",
            dry_run_msg
        );

        let db = self.store.database().await.map_err(PurgeError::Connect)?;
        let repo = db.price_alerts();

        let fetched = fetch_all(repo.as_ref(), &filter).await;
        tracing::info!(
            total = fetched.records.len(),
            complete = fetched.complete,
            "Fetched price alerts newer than cutoff"
        );

        let mut report = PurgeReport {
            cutoff,
            fetched: fetched.records.len(),
            read_complete: fetched.complete,
            archive: None,
            delete: DeleteOutcome::NotAttempted,
        };

        if fetched.records.is_empty() {
            tracing::info!("No price alerts to archive, run complete");
            return Ok(report);
        }

        let summary = self.exporter.write_archive(&fetched.records, now)?;
        tracing::info!(
            path = %summary.path.display(),
            rows = summary.rows,
            "Wrote price alert archive"
        );
        report.archive = Some(summary);

        report.delete = if self.config.dry_run {
            tracing::info!(
                cutoff = %cutoff,
                total = report.fetched,
                "DRY RUN: Would delete {} archived price alerts",
                report.fetched
            );
            DeleteOutcome::SkippedDryRun
        } else if !fetched.complete {
            tracing::warn!(
                archived = report.fetched,
                "Read ended early, skipping delete so unarchived price alerts are kept"
            );
            DeleteOutcome::SkippedPartialRead
        } else {
            match repo.delete_many(&filter).await {
                Ok(deleted) => {
                    tracing::info!(
                        deleted = deleted,
                        cutoff = %cutoff,
                        "Deleted archived price alerts"
                    );
                    DeleteOutcome::Deleted(deleted)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to delete archived price alerts");
                    DeleteOutcome::Failed
                }
            }
        };

        Ok(report)
    }
}

struct Fetched {
    records: Vec<PriceAlertRecord>,
    complete: bool,
}

/// Drain the cursor into memory. Failures are logged and end the read.
async fn fetch_all(repo: &dyn PriceAlertRepo, filter: &PriceAlertFilter) -> Fetched {
    let mut stream = match repo.find(filter).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "Failed to query price alerts");
            return Fetched {
                records: Vec::new(),
                complete: false,
            };
        }
    };

    let mut records = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    read = records.len(),
                    "Price alert cursor failed"
                );
                return Fetched {
                    records,
                    complete: false,
                };
            }
        }
    }

    Fetched {
        records,
        complete: true,
    }
}
