// Rust guideline compliant 2026-10-13

//! Clock abstraction for Libris services.
//!
//! Services never read the system time directly; they ask the library's
//! clock, so tests can pin "now".

use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// End of a caller-chosen period of `days` starting at `now`.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if `days` exceeds `max` or the end
/// falls outside the representable range.
pub(crate) fn period_end(
    now: DateTime<Utc>,
    days: u32,
    max: u32,
    what: &str,
) -> Result<DateTime<Utc>> {
    if days > max {
        return Err(AppError::InvalidInput(format!(
            "{what} must be at most {max} days"
        )));
    }
    libris_core::fine::days_after(now, days).map_err(|e| AppError::InvalidInput(e.to_string()))
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and replay.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
