//! Archive file configuration.
//!
//! # Example
//!
//! ```toml
//! [archive]
//! directory = "/var/lib/price-alert-archiver"
//! file_prefix = "priceAlertHistoryLog"
//! timezone = "utc"              # row timestamps
//! file_date_timezone = "local"   # date in the file name
//! quoting = "never"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Where and how archive files are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Directory that receives archive files. Must already exist.
    /// Default: the process working directory.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File name prefix; the file is named `<prefix>-<YYYY-MM-DD>.csv`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Timezone used to render row timestamps.
    /// Default: utc
    #[serde(default)]
    pub timezone: ArchiveTimezone,

    /// Timezone whose calendar day names the archive file.
    /// Default: local
    #[serde(default = "default_file_date_timezone")]
    pub file_date_timezone: ArchiveTimezone,

    /// Field quoting policy.
    #[serde(default)]
    pub quoting: ArchiveQuoting,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_prefix: default_file_prefix(),
            timezone: ArchiveTimezone::default(),
            file_date_timezone: default_file_date_timezone(),
            quoting: ArchiveQuoting::default(),
        }
    }
}

impl ArchiveConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.file_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "archive.file_prefix cannot be empty".into(),
            ));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "archive.file_prefix cannot contain path separators; use archive.directory".into(),
            ));
        }
        Ok(())
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_date_timezone() -> ArchiveTimezone {
    ArchiveTimezone::Local
}

fn default_file_prefix() -> String {
    "priceAlertHistoryLog".to_string()
}

/// Timezone for rendering dates in the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveTimezone {
    /// Coordinated Universal Time.
    #[default]
    Utc,
    /// The host's local timezone.
    Local,
}

/// Quoting policy for archive fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveQuoting {
    /// Write every field verbatim. A product id containing a comma or newline
    /// produces a malformed row.
    #[default]
    Never,
    /// Quote fields that contain delimiters, quotes, or line breaks.
    Necessary,
}
