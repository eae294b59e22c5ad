// Rust guideline compliant 2026-10-09

//! Overdue fine assessment and due-date arithmetic.
//!
//! Lateness is counted in started days: one millisecond past the due date is
//! one day late.

use chrono::{DateTime, Duration, Utc};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Default fine per day late, in minor currency units.
pub const DEFAULT_RATE_PER_DAY: i64 = 10_000;

/// Returns `ceil((returned - due) / 1 day)`, or 0 if returned on time.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use libris_core::fine::days_late;
///
/// let due = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
/// let returned = Utc.with_ymd_and_hms(2024, 1, 13, 0, 0, 0).unwrap();
/// assert_eq!(days_late(due, returned), 3);
/// ```
#[must_use]
pub fn days_late(due: DateTime<Utc>, returned: DateTime<Utc>) -> i64 {
    let late_ms = (returned - due).num_milliseconds();
    if late_ms <= 0 {
        return 0;
    }
    late_ms.saturating_add(DAY_MS - 1) / DAY_MS
}

/// Fine owed for the given lateness, or `None` when nothing is owed.
#[must_use]
pub fn fine_amount(days_late: i64, rate_per_day: i64) -> Option<i64> {
    if days_late <= 0 || rate_per_day <= 0 {
        return None;
    }
    Some(days_late.saturating_mul(rate_per_day))
}

/// Returns the instant `days` whole days after `start`.
///
/// # Errors
///
/// Returns [`crate::Error::Invalid`] if the result is past the last
/// representable date.
pub fn days_after(start: DateTime<Utc>, days: u32) -> crate::Result<DateTime<Utc>> {
    start
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| crate::Error::Invalid(format!("{days} days after {start} is out of range")))
}
