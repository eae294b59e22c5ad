// Rust guideline compliant 2026-10-15

//! Reader holds on book copies.

use crate::error::{AppError, Result};
use crate::library::Library;
use crate::time::period_end;
use chrono::{DateTime, Utc};
use libris_core::{CopyStatus, Reservation, ReservationStatus, Role};
use serde::Serialize;

/// Row limit for a reader's reservation list.
pub const RESERVATION_LIST_LIMIT: usize = 50;

/// A reservation joined with its book title.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    /// Reservation id.
    pub id: u64,
    /// Current status.
    pub status: ReservationStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Hold deadline.
    pub expires_at: DateTime<Utc>,
    /// Reserved book.
    pub book_id: u64,
    /// Title of the reserved book.
    pub title: String,
    /// Held copy.
    pub copy_id: u64,
}

fn view(reservation: &Reservation, title: String) -> ReservationView {
    ReservationView {
        id: reservation.id,
        status: reservation.status,
        created_at: reservation.created_at,
        expires_at: reservation.expires_at,
        book_id: reservation.book_id,
        title,
        copy_id: reservation.copy_id,
    }
}

/// Holds the lowest-numbered AVAILABLE copy of a book for the caller.
///
/// # Arguments
///
/// * `book_id` - Book to reserve
/// * `hold_days` - Hold length; the configured default when `None` or zero
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a hold longer than
/// `max_hold_days` or if no copy is AVAILABLE, and a not-found error for an
/// unknown book.
pub fn reserve(library: &Library, book_id: u64, hold_days: Option<u32>) -> Result<ReservationView> {
    let days = hold_days
        .filter(|d| *d > 0)
        .unwrap_or(library.config().default_hold_days);
    let max = library.config().max_hold_days;

    library.transaction_as(Role::Reader, |ledger, actor, now| {
        let expires_at = period_end(now, days, max, "Hold length")?;
        let title = ledger.book(book_id)?.title.clone();
        let copy_id = ledger
            .copies_of(book_id)
            .find(|c| c.status == CopyStatus::Available)
            .map(|c| c.id)
            .ok_or_else(|| AppError::InvalidInput("No available copy to reserve".to_string()))?;

        let id = ledger.place_hold(actor.user_id, copy_id, expires_at, now)?;
        let reservation = ledger
            .reservations
            .get(&id)
            .ok_or_else(|| AppError::not_found("Reservation"))?;
        Ok(view(reservation, title))
    })
}

/// The caller's reservations, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn my_reservations(library: &Library) -> Result<Vec<ReservationView>> {
    library.read_as(Role::Reader, |ledger, actor, _| {
        let mut mine: Vec<&Reservation> = ledger
            .reservations
            .values()
            .filter(|r| r.reader_id == actor.user_id)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(mine
            .into_iter()
            .take(RESERVATION_LIST_LIMIT)
            .map(|r| {
                let title = ledger
                    .books
                    .get(&r.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default();
                view(r, title)
            })
            .collect())
    })
}

/// Cancels one of the caller's reservations.
///
/// A reservation that is no longer ACTIVE is left alone.
///
/// # Returns
///
/// True if the reservation was cancelled by this call.
///
/// # Errors
///
/// Returns a not-found error unless the reservation belongs to the caller.
pub fn cancel_reservation(library: &Library, reservation_id: u64) -> Result<bool> {
    library.transaction_as(Role::Reader, |ledger, actor, now| {
        let status = ledger
            .reservations
            .get(&reservation_id)
            .filter(|r| r.reader_id == actor.user_id)
            .map(|r| r.status)
            .ok_or_else(|| AppError::not_found("Reservation"))?;
        if status != ReservationStatus::Active {
            tracing::debug!(reservation_id, %status, "cancel ignored");
            return Ok(false);
        }
        ledger.close_reservation(reservation_id, ReservationStatus::Cancelled, now)?;
        Ok(true)
    })
}
