//! Retention window configuration.
//!
//! Selects which price alerts one run archives and purges.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! window_hours = 24   # 168 for a weekly sweep
//! dry_run = false
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention configuration.
///
/// Each run computes `cutoff = now - window_hours` and selects every record
/// whose `date` is strictly after the cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Size of the selection window in hours.
    /// Default: 24
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,

    /// If true, write the archive but do not delete anything.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            dry_run: false,
        }
    }
}

fn default_window_hours() -> u64 {
    24
}

/// Upper bound on the window (100 years) so cutoff arithmetic cannot overflow.
const MAX_WINDOW_HOURS: u64 = 100 * 365 * 24;

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_hours == 0 {
            return Err(ConfigError::Validation(
                "retention.window_hours must be greater than 0".into(),
            ));
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(ConfigError::Validation(format!(
                "retention.window_hours cannot exceed {MAX_WINDOW_HOURS}"
            )));
        }
        Ok(())
    }

    /// The window as a chrono Duration.
    pub fn window(&self) -> Duration {
        Duration::hours(self.window_hours as i64)
    }

    /// Compute the cutoff for a run starting at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window()
    }
}
