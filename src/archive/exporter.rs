use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{
    error::{ArchiveError, ArchiveResult},
    format::{format_file_date, format_price, format_timestamp},
};
use crate::{
    config::{ArchiveConfig, ArchiveQuoting, ArchiveTimezone},
    models::PriceAlertRecord,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 3] = ["date", "productId", "price"];

/// Outcome of a completed archive write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Data rows written, excluding the header.
    pub rows: usize,
}

/// Writes purge batches to dated CSV files.
#[derive(Debug, Clone)]
pub struct ArchiveExporter {
    directory: PathBuf,
    file_prefix: String,
    timezone: ArchiveTimezone,
    file_date_timezone: ArchiveTimezone,
    quoting: ArchiveQuoting,
}

impl ArchiveExporter {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            file_prefix: config.file_prefix.clone(),
            timezone: config.timezone,
            file_date_timezone: config.file_date_timezone,
            quoting: config.quoting,
        }
    }

    /// `<prefix>-<YYYY-MM-DD>.csv` for the calendar day of `now` in the
    /// file date timezone (the host's local day by default).
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}-{}.csv",
            self.file_prefix,
            format_file_date(&now, self.file_date_timezone)
        )
    }

    pub fn archive_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.directory.join(self.file_name(now))
    }

    /// Write `records` to the archive file for `now`, replacing any file of
    /// the same name.
    ///
    /// The file is flushed and synced before this returns, so callers may
    /// delete the source records once it succeeds.
    pub fn write_archive(
        &self,
        records: &[PriceAlertRecord],
        now: DateTime<Utc>,
    ) -> ArchiveResult<ArchiveSummary> {
        let path = self.archive_path(now);

        tracing::debug!(
            path = %path.display(),
            rows = records.len(),
            "Writing price alert archive"
        );

        if path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Replacing existing price alert archive"
            );
        }

        let file = File::create(&path).map_err(|source| ArchiveError::Create {
            path: path.clone(),
            source,
        })?;

        let mut out = BufWriter::new(file);
        out.write_all(UTF8_BOM)
            .map_err(|source| write_error(&path, source))?;

        let mut writer = WriterBuilder::new()
            .quote_style(match self.quoting {
                ArchiveQuoting::Never => QuoteStyle::Never,
                ArchiveQuoting::Necessary => QuoteStyle::Necessary,
            })
            .terminator(Terminator::Any(b'\n'))
            .from_writer(out);

        writer
            .write_record(HEADER)
            .map_err(|source| csv_error(&path, source))?;

        for record in records {
            let date = format_timestamp(&record.date, self.timezone);
            let price = format_price(record.price);
            writer
                .write_record([date.as_str(), record.product_id.as_str(), price.as_str()])
                .map_err(|source| csv_error(&path, source))?;
        }

        let out = writer
            .into_inner()
            .map_err(|e| write_error(&path, e.into_error()))?;
        let file = out
            .into_inner()
            .map_err(|e| write_error(&path, e.into_error()))?;
        file.sync_all()
            .map_err(|source| write_error(&path, source))?;

        Ok(ArchiveSummary {
            path,
            rows: records.len(),
        })
    }
}

fn write_error(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> ArchiveError {
    ArchiveError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
