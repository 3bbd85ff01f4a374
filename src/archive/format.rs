//! Field rendering for archive rows.

use chrono::{DateTime, Local, Utc};

use crate::config::ArchiveTimezone;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a record timestamp as `YYYY-MM-DD HH:MM:SS` in the given zone.
pub fn format_timestamp(date: &DateTime<Utc>, timezone: ArchiveTimezone) -> String {
    match timezone {
        ArchiveTimezone::Utc => date.format(TIMESTAMP_FORMAT).to_string(),
        ArchiveTimezone::Local => date
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    }
}

/// Render the calendar date used in archive file names.
pub(crate) fn format_file_date(now: &DateTime<Utc>, timezone: ArchiveTimezone) -> String {
    match timezone {
        ArchiveTimezone::Utc => now.format(FILE_DATE_FORMAT).to_string(),
        ArchiveTimezone::Local => now
            .with_timezone(&Local)
            .format(FILE_DATE_FORMAT)
            .to_string(),
    }
}

/// Exponents at or beyond these bounds switch to scientific notation.
const MIN_PLAIN_EXPONENT: i32 = -4;
const MAX_PLAIN_EXPONENT: i32 = 6;

/// Render a price as the shortest decimal that round-trips.
///
/// Plain notation for decimal exponents in `[-4, 6)`, otherwise scientific
/// with a signed, at least two digit exponent (`1e+06`, `1.5e-05`).
/// Non-finite values render as `+Inf`, `-Inf` and `NaN`.
pub fn format_price(price: f64) -> String {
    if price.is_nan() {
        return "NaN".to_string();
    }
    if price.is_infinite() {
        return if price > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.5e-5`.
    let scientific = format!("{price:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return price.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return price.to_string();
    };

    if (MIN_PLAIN_EXPONENT..MAX_PLAIN_EXPONENT).contains(&exponent) {
        price.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}
