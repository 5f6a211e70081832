//! # Report Windows
//!
//! Date parsing and UTC window construction for the reporting pipeline.
//!
//! ## Window Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Report Windows                                    │
//! │                                                                         │
//! │  Daily:    [2024-03-15 00:00:00.000, 2024-03-15 23:59:59.999]          │
//! │  Range:    [start 00:00:00.000,      end   23:59:59.999]  (inclusive)  │
//! │  Month:    [first 00:00:00.000,      last  23:59:59.999]               │
//! │  Year:     [Jan 1 00:00:00.000,      Dec 31 23:59:59.999]              │
//! │  Growth:   [start 00:00,             end   00:00)         (half-open)  │
//! │                                                                         │
//! │  All windows are UTC. Dates arrive as strict YYYY-MM-DD strings.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::error::ValidationError;
use crate::types::ReportFrequency;

/// English month names, indexed by month number - 1.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// =============================================================================
// Parsing
// =============================================================================

/// Parses a strict `YYYY-MM-DD` date string.
///
/// Rejects unpadded forms like `2024-3-15` — report query parameters are
/// exact-format by contract.
///
/// ## Example
/// ```rust
/// use bazaar_core::dates::parse_report_date;
///
/// assert!(parse_report_date("2024-03-15").is_ok());
/// assert!(parse_report_date("2024-3-15").is_err());
/// assert!(parse_report_date("2024-02-30").is_err());
/// ```
pub fn parse_report_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());

    if !shape_ok {
        return Err(ValidationError::InvalidDate {
            value: value.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parses a four-digit year.
pub fn parse_year(value: &str) -> Result<i32, ValidationError> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidYear);
    }
    value.parse().map_err(|_| ValidationError::InvalidYear)
}

/// Parses a month given as a number (1-12) or a case-insensitive English
/// name or three-letter abbreviation.
///
/// ## Example
/// ```rust
/// use bazaar_core::dates::parse_month;
///
/// assert_eq!(parse_month("3").unwrap(), 3);
/// assert_eq!(parse_month("March").unwrap(), 3);
/// assert_eq!(parse_month("mar").unwrap(), 3);
/// assert!(parse_month("13").is_err());
/// assert!(parse_month("Smarch").is_err());
/// ```
pub fn parse_month(value: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidMonth {
        value: value.to_string(),
    };

    if value.bytes().all(|b| b.is_ascii_digit()) && !value.is_empty() {
        let number: u32 = value.parse().map_err(|_| invalid())?;
        if (1..=12).contains(&number) {
            return Ok(number);
        }
        return Err(invalid());
    }

    let lowered = value.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            // Full name or conventional three-letter abbreviation. "sep"
            // covers September; longer prefixes like "sept" do not count.
            name == lowered || (lowered.len() == 3 && name.starts_with(&lowered))
        })
        .map(|idx| idx as u32 + 1)
        .ok_or_else(invalid)
}

/// Returns the calendar label for a month, e.g. `"March 2024"`.
pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown");
    format!("{} {}", name, year)
}

// =============================================================================
// Window Construction
// =============================================================================

/// Midnight UTC at the start of the given day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// The last represented millisecond of the given day (23:59:59.999 UTC).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::milliseconds(86_400_000 - 1)
}

/// The inclusive UTC window covering a single day.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (start_of_day(date), end_of_day(date))
}

/// The inclusive UTC window covering a day range.
///
/// The start day must not come after the end day (equal is allowed — a
/// one-day range).
pub fn range_window(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    if start > end {
        return Err(ValidationError::DateRangeOrder);
    }
    Ok((start_of_day(start), end_of_day(end)))
}

/// The half-open UTC window `[start 00:00, end 00:00)` used by growth
/// comparisons. The start must be strictly before the end.
pub fn half_open_window(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    if start >= end {
        return Err(ValidationError::DateRangeOrder);
    }
    Ok((start_of_day(start), start_of_day(end)))
}

/// The inclusive UTC window covering one calendar month.
pub fn month_window(
    year: i32,
    month: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::InvalidMonth {
        value: month.to_string(),
    })?;
    let next_month = first + Months::new(1);
    Ok((
        start_of_day(first),
        start_of_day(next_month) - Duration::milliseconds(1),
    ))
}

/// The inclusive UTC window covering one calendar year.
pub fn year_window(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ValidationError::InvalidYear)?;
    let dec_last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(ValidationError::InvalidYear)?;
    Ok((start_of_day(jan_first), end_of_day(dec_last)))
}

/// The `"Month Year"` label for the month a timestamp falls in, plus the
/// month number for chronological ordering.
pub fn month_of(timestamp: DateTime<Utc>) -> (u32, String) {
    let month = timestamp.month();
    (month, month_label(timestamp.year(), month))
}

// =============================================================================
// Schedule Advancement
// =============================================================================

/// The next run time for a subscription that was just delivered at `now`.
///
/// Monthly advancement is calendar-aware (Jan 31 + 1 month = Feb 28/29);
/// if the calendar addition cannot be represented, fall back to 30 days.
pub fn next_run_after(now: DateTime<Utc>, frequency: ReportFrequency) -> DateTime<Utc> {
    match frequency {
        ReportFrequency::Daily => now + Duration::days(1),
        ReportFrequency::Weekly => now + Duration::days(7),
        ReportFrequency::Monthly => now
            .checked_add_months(Months::new(1))
            .unwrap_or(now + Duration::days(30)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
