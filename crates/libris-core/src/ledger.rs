// Rust guideline compliant 2026-10-10

//! In-memory ledger of all library records.
//!
//! The ledger is rebuilt from the JSONL records on every transaction and
//! flattened back when the transaction commits. Copy status is private to
//! this module: every status change goes through [`Ledger::transition_copy`],
//! which enforces the copy state machine.

use crate::fine;
use crate::fsm::CopyEvent;
use crate::models::{
    Book, BookCopy, BorrowOrder, Borrowing, BorrowingStatus, CopyStatus, Fine, Payment,
    PaymentStatus, PaymentTarget, Record, Reservation, ReservationStatus, Review, Session, User,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// An inconsistency found by [`Ledger::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Record the finding is about, e.g. `copy 7`.
    pub subject: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Counts of records removed by [`Ledger::remove_book`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovedCounts {
    /// Copies removed.
    pub copies: usize,
    /// Reservations removed.
    pub reservations: usize,
    /// Borrowings removed.
    pub borrowings: usize,
    /// Fines removed.
    pub fines: usize,
    /// Fine payments removed.
    pub payments: usize,
    /// Reviews removed.
    pub reviews: usize,
}

/// Typed tables for every record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Accounts by id.
    pub users: BTreeMap<u64, User>,
    /// Sessions by token.
    pub sessions: BTreeMap<String, Session>,
    /// Books by id.
    pub books: BTreeMap<u64, Book>,
    copies: BTreeMap<u64, BookCopy>,
    /// Reservations by id.
    pub reservations: BTreeMap<u64, Reservation>,
    /// Borrowings by id.
    pub borrowings: BTreeMap<u64, Borrowing>,
    /// Fines by id.
    pub fines: BTreeMap<u64, Fine>,
    /// Orders by id.
    pub orders: BTreeMap<u64, BorrowOrder>,
    /// Payments by id.
    pub payments: BTreeMap<u64, Payment>,
    /// Reviews by id.
    pub reviews: BTreeMap<u64, Review>,
}

fn insert_unique<T>(map: &mut BTreeMap<u64, T>, kind: &str, id: u64, value: T) -> Result<()> {
    if map.insert(id, value).is_some() {
        return Err(Error::Invalid(format!("Duplicate {kind} id {id}")));
    }
    Ok(())
}

fn next_key<T>(map: &BTreeMap<u64, T>) -> u64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from storage records.
    ///
    /// # Errors
    ///
    /// Returns an error if two records of the same kind share an id.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut ledger = Self::default();
        for record in records {
            match record {
                Record::User(user) => insert_unique(&mut ledger.users, "user", user.id, user)?,
                Record::Session(session) => {
                    ledger.sessions.insert(session.token.clone(), session);
                }
                Record::Book(book) => insert_unique(&mut ledger.books, "book", book.id, book)?,
                Record::Copy(copy) => insert_unique(&mut ledger.copies, "copy", copy.id, copy)?,
                Record::Reservation(r) => {
                    insert_unique(&mut ledger.reservations, "reservation", r.id, r)?
                }
                Record::Borrowing(b) => {
                    insert_unique(&mut ledger.borrowings, "borrowing", b.id, b)?
                }
                Record::Fine(f) => insert_unique(&mut ledger.fines, "fine", f.id, f)?,
                Record::Order(o) => insert_unique(&mut ledger.orders, "order", o.id, o)?,
                Record::Payment(p) => insert_unique(&mut ledger.payments, "payment", p.id, p)?,
                Record::Review(r) => insert_unique(&mut ledger.reviews, "review", r.id, r)?,
            }
        }
        Ok(ledger)
    }

    /// Flattens the ledger into records, grouped by kind and ordered by id.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        let mut records = Vec::with_capacity(self.len());
        records.extend(self.users.values().cloned().map(Record::User));
        records.extend(self.sessions.values().cloned().map(Record::Session));
        records.extend(self.books.values().cloned().map(Record::Book));
        records.extend(self.copies.values().cloned().map(Record::Copy));
        records.extend(self.reservations.values().cloned().map(Record::Reservation));
        records.extend(self.borrowings.values().cloned().map(Record::Borrowing));
        records.extend(self.fines.values().cloned().map(Record::Fine));
        records.extend(self.orders.values().cloned().map(Record::Order));
        records.extend(self.payments.values().cloned().map(Record::Payment));
        records.extend(self.reviews.values().cloned().map(Record::Review));
        records
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
            + self.sessions.len()
            + self.books.len()
            + self.copies.len()
            + self.reservations.len()
            + self.borrowings.len()
            + self.fines.len()
            + self.orders.len()
            + self.payments.len()
            + self.reviews.len()
    }

    /// Returns true if the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Id allocation.
impl Ledger {
    /// Next free user id.
    #[must_use]
    pub fn next_user_id(&self) -> u64 {
        next_key(&self.users)
    }

    /// Next free book id.
    #[must_use]
    pub fn next_book_id(&self) -> u64 {
        next_key(&self.books)
    }

    /// Next free reservation id.
    #[must_use]
    pub fn next_reservation_id(&self) -> u64 {
        next_key(&self.reservations)
    }

    /// Next free borrowing id.
    #[must_use]
    pub fn next_borrowing_id(&self) -> u64 {
        next_key(&self.borrowings)
    }

    /// Next free fine id.
    #[must_use]
    pub fn next_fine_id(&self) -> u64 {
        next_key(&self.fines)
    }

    /// Next free order id.
    #[must_use]
    pub fn next_order_id(&self) -> u64 {
        next_key(&self.orders)
    }

    /// Next free payment id.
    #[must_use]
    pub fn next_payment_id(&self) -> u64 {
        next_key(&self.payments)
    }

    /// Next free review id.
    #[must_use]
    pub fn next_review_id(&self) -> u64 {
        next_key(&self.reviews)
    }

    /// Next free order item id. Item ids are unique across orders.
    #[must_use]
    pub fn next_order_item_id(&self) -> u64 {
        self.orders
            .values()
            .flat_map(|order| order.items.iter().map(|item| item.id))
            .max()
            .map_or(1, |last| last + 1)
    }
}

// Lookups.
impl Ledger {
    /// Looks up a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the user does not exist.
    pub fn user(&self, id: u64) -> Result<&User> {
        self.users.get(&id).ok_or_else(|| Error::not_found("User", id))
    }

    /// Looks up a book.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the book does not exist.
    pub fn book(&self, id: u64) -> Result<&Book> {
        self.books.get(&id).ok_or_else(|| Error::not_found("Book", id))
    }

    /// Looks up a copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the copy does not exist.
    pub fn copy(&self, id: u64) -> Result<&BookCopy> {
        self.copies.get(&id).ok_or_else(|| Error::not_found("Book copy", id))
    }

    /// Iterates over all copies in id order.
    pub fn copies(&self) -> impl Iterator<Item = &BookCopy> {
        self.copies.values()
    }

    /// Iterates over the copies of one book in id order.
    pub fn copies_of(&self, book_id: u64) -> impl Iterator<Item = &BookCopy> {
        self.copies.values().filter(move |copy| copy.book_id == book_id)
    }

    /// Number of AVAILABLE copies of a book.
    #[must_use]
    pub fn available_copy_count(&self, book_id: u64) -> u32 {
        let count = self
            .copies_of(book_id)
            .filter(|copy| copy.status == CopyStatus::Available)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Most recent ACTIVE borrowing of a copy.
    #[must_use]
    pub fn active_borrowing_for_copy(&self, copy_id: u64) -> Option<&Borrowing> {
        self.borrowings
            .values()
            .filter(|b| b.copy_id == copy_id && b.status == BorrowingStatus::Active)
            .max_by_key(|b| (b.borrow_date, b.id))
    }

    /// ACTIVE, unexpired reservation of `copy_id` held by `reader_id` for `book_id`.
    #[must_use]
    pub fn active_reservation_for(
        &self,
        copy_id: u64,
        reader_id: u64,
        book_id: u64,
        now: DateTime<Utc>,
    ) -> Option<&Reservation> {
        self.reservations.values().find(|r| {
            r.copy_id == copy_id
                && r.reader_id == reader_id
                && r.book_id == book_id
                && r.status == ReservationStatus::Active
                && r.expires_at > now
        })
    }

    /// The fine assessed for a borrowing, if any.
    #[must_use]
    pub fn fine_for_borrowing(&self, borrowing_id: u64) -> Option<&Fine> {
        self.fines.values().find(|f| f.borrowing_id == borrowing_id)
    }

    /// Payments recorded against a target.
    pub fn payments_for(&self, target: PaymentTarget) -> impl Iterator<Item = &Payment> {
        self.payments.values().filter(move |p| p.target == target)
    }

    /// Returns true if a PAID payment exists for the fine.
    #[must_use]
    pub fn is_fine_paid(&self, fine_id: u64) -> bool {
        self.payments_for(PaymentTarget::Fine(fine_id))
            .any(|p| p.status == PaymentStatus::Paid)
    }

    /// A reader's review of a book, if any.
    #[must_use]
    pub fn review_by(&self, reader_id: u64, book_id: u64) -> Option<&Review> {
        self.reviews
            .values()
            .find(|r| r.reader_id == reader_id && r.book_id == book_id)
    }

    /// Reviews of a book in id order.
    pub fn reviews_of(&self, book_id: u64) -> impl Iterator<Item = &Review> {
        self.reviews.values().filter(move |r| r.book_id == book_id)
    }

    /// Borrowings issued from an order.
    #[must_use]
    pub fn order_borrowings(&self, order_id: u64) -> Vec<&Borrowing> {
        self.borrowings
            .values()
            .filter(|b| b.order_id == Some(order_id))
            .collect()
    }
}

// Lifecycle mutations.
impl Ledger {
    /// Applies a copy event and stores the new status.
    ///
    /// This is the only place copy status is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy does not exist or the event is not legal
    /// in its current status.
    pub fn transition_copy(
        &mut self,
        copy_id: u64,
        event: CopyEvent,
        now: DateTime<Utc>,
    ) -> Result<CopyStatus> {
        let copy = self
            .copies
            .get_mut(&copy_id)
            .ok_or_else(|| Error::not_found("Book copy", copy_id))?;
        let from = copy.status;
        let to = from.apply(event)?;
        copy.status = to;
        copy.updated_at = now;
        tracing::debug!(copy_id, %event, %from, %to, "copy transition");
        Ok(to)
    }

    /// Adds a new AVAILABLE copy of a book and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the book does not exist.
    pub fn insert_copy(&mut self, book_id: u64, now: DateTime<Utc>) -> Result<u64> {
        self.book(book_id)?;
        let id = next_key(&self.copies);
        self.copies.insert(
            id,
            BookCopy {
                id,
                book_id,
                status: CopyStatus::Available,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    /// Holds an AVAILABLE copy for a reader until `expires_at`.
    ///
    /// # Returns
    ///
    /// The new reservation id.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy does not exist or is not AVAILABLE.
    pub fn place_hold(
        &mut self,
        reader_id: u64,
        copy_id: u64,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let book_id = self.copy(copy_id)?.book_id;
        self.transition_copy(copy_id, CopyEvent::Reserve, now)?;

        let id = self.next_reservation_id();
        self.reservations.insert(
            id,
            Reservation {
                id,
                reader_id,
                book_id,
                copy_id,
                status: ReservationStatus::Active,
                created_at: now,
                expires_at,
            },
        );
        tracing::info!(reservation_id = id, reader_id, copy_id, %expires_at, "copy reserved");
        Ok(id)
    }

    /// Moves an ACTIVE reservation to a closing status.
    ///
    /// Cancelling or expiring a hold releases the copy if it is still
    /// RESERVED; a copy in any other status is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation does not exist or is not ACTIVE.
    pub fn close_reservation(
        &mut self,
        reservation_id: u64,
        target: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let reservation = self
            .reservations
            .get_mut(&reservation_id)
            .ok_or_else(|| Error::not_found("Reservation", reservation_id))?;
        reservation.status.can_transition_to(target)?;
        reservation.status = target;
        let copy_id = reservation.copy_id;
        tracing::info!(reservation_id, copy_id, status = %target, "reservation closed");

        if matches!(
            target,
            ReservationStatus::Cancelled | ReservationStatus::Expired
        ) {
            self.release_hold(copy_id, now);
        }
        Ok(())
    }

    fn release_hold(&mut self, copy_id: u64, now: DateTime<Utc>) {
        match self.copies.get(&copy_id).map(|copy| copy.status) {
            Some(CopyStatus::Reserved) => {
                // Status checked above; the transition cannot fail.
                let _ = self.transition_copy(copy_id, CopyEvent::ReleaseHold, now);
            }
            Some(status) => {
                tracing::warn!(copy_id, %status, "hold released on a copy that is not reserved");
            }
            None => tracing::warn!(copy_id, "hold released on a missing copy"),
        }
    }

    /// Expires every ACTIVE reservation whose deadline has passed.
    ///
    /// Each lapsed reservation becomes EXPIRED and its copy goes back to
    /// AVAILABLE. Only ACTIVE reservations are considered, so a reservation
    /// expires at most once.
    ///
    /// # Returns
    ///
    /// Ids of the reservations expired by this call.
    pub fn expire_reservations(&mut self, now: DateTime<Utc>) -> Vec<u64> {
        let lapsed: Vec<u64> = self
            .reservations
            .values()
            .filter(|r| r.is_lapsed(now))
            .map(|r| r.id)
            .collect();

        for id in &lapsed {
            if let Err(err) = self.close_reservation(*id, ReservationStatus::Expired, now) {
                tracing::warn!(reservation_id = id, error = %err, "failed to expire reservation");
            }
        }

        if lapsed.is_empty() {
            tracing::debug!("reservation sweep found nothing to expire");
        } else {
            tracing::info!(count = lapsed.len(), ids = ?lapsed, "expired reservations");
        }
        lapsed
    }

    /// Lends a copy to a reader.
    ///
    /// An AVAILABLE copy is issued directly. A RESERVED copy is issued only
    /// if `reader_id` holds an ACTIVE, unexpired reservation for it; that
    /// reservation becomes FULFILLED.
    ///
    /// # Arguments
    ///
    /// * `reader_id` - Borrowing reader
    /// * `copy_id` - Copy to lend
    /// * `order_id` - Order the loan belongs to, if any
    /// * `due` - Due date
    /// * `now` - Current time
    ///
    /// # Returns
    ///
    /// The new borrowing id.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy does not exist, is held for someone
    /// else, or is not in an issuable status.
    pub fn issue_copy(
        &mut self,
        reader_id: u64,
        copy_id: u64,
        order_id: Option<u64>,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let copy = self.copy(copy_id)?;
        let book_id = copy.book_id;

        let held = if copy.status == CopyStatus::Reserved {
            let reservation = self
                .active_reservation_for(copy_id, reader_id, book_id, now)
                .ok_or_else(|| {
                    Error::InvalidTransition(format!(
                        "Copy {copy_id} is reserved for another reader"
                    ))
                })?;
            Some(reservation.id)
        } else {
            None
        };

        self.transition_copy(copy_id, CopyEvent::Issue, now)?;
        if let Some(reservation_id) = held {
            self.close_reservation(reservation_id, ReservationStatus::Fulfilled, now)?;
        }

        let id = self.next_borrowing_id();
        self.borrowings.insert(
            id,
            Borrowing {
                id,
                reader_id,
                copy_id,
                book_id,
                order_id,
                borrow_date: now,
                due_date: due,
                return_date: None,
                status: BorrowingStatus::Active,
            },
        );
        tracing::info!(borrowing_id = id, reader_id, copy_id, ?order_id, %due, "copy issued");
        Ok(id)
    }

    /// Closes the most recent ACTIVE borrowing of a copy.
    ///
    /// # Returns
    ///
    /// The closed borrowing id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the copy has no active borrowing, or a
    /// transition error if the copy is not BORROWED.
    pub fn return_copy(&mut self, copy_id: u64, now: DateTime<Utc>) -> Result<u64> {
        let borrowing_id = self
            .active_borrowing_for_copy(copy_id)
            .map(|b| b.id)
            .ok_or_else(|| Error::NotFound {
                entity: "Active borrowing for copy",
                id: copy_id.to_string(),
            })?;

        self.transition_copy(copy_id, CopyEvent::Return, now)?;

        let borrowing = self
            .borrowings
            .get_mut(&borrowing_id)
            .ok_or_else(|| Error::not_found("Borrowing", borrowing_id))?;
        borrowing.status.can_transition_to(BorrowingStatus::Returned)?;
        borrowing.status = BorrowingStatus::Returned;
        borrowing.return_date = Some(now);
        tracing::info!(borrowing_id, copy_id, "copy returned");
        Ok(borrowing_id)
    }

    /// Creates the overdue fine for a returned borrowing, at most once.
    ///
    /// # Returns
    ///
    /// The new fine id, or `None` if the borrowing was on time, already
    /// fined, or not yet returned.
    pub fn assess_fine(
        &mut self,
        borrowing_id: u64,
        rate_per_day: i64,
        now: DateTime<Utc>,
    ) -> Option<u64> {
        let borrowing = self.borrowings.get(&borrowing_id)?;
        let returned = borrowing.return_date?;
        let days = fine::days_late(borrowing.due_date, returned);
        let amount = fine::fine_amount(days, rate_per_day)?;

        if self.fine_for_borrowing(borrowing_id).is_some() {
            return None;
        }

        let id = self.next_fine_id();
        self.fines.insert(
            id,
            Fine {
                id,
                borrowing_id,
                amount,
                fine_date: now,
            },
        );
        tracing::info!(fine_id = id, borrowing_id, days_late = days, amount, "fine assessed");
        Some(id)
    }

    /// Removes a book together with its copies, holds, loans, fines, fine
    /// payments and reviews.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the book does not exist.
    pub fn remove_book(&mut self, book_id: u64) -> Result<RemovedCounts> {
        self.book(book_id)?;
        let mut counts = RemovedCounts::default();

        let copy_ids: Vec<u64> = self.copies_of(book_id).map(|c| c.id).collect();
        let touches = |copy_id: u64, owner: u64| owner == book_id || copy_ids.contains(&copy_id);

        let borrowing_ids: Vec<u64> = self
            .borrowings
            .values()
            .filter(|b| touches(b.copy_id, b.book_id))
            .map(|b| b.id)
            .collect();
        let fine_ids: Vec<u64> = self
            .fines
            .values()
            .filter(|f| borrowing_ids.contains(&f.borrowing_id))
            .map(|f| f.id)
            .collect();

        let before = self.payments.len();
        self.payments.retain(|_, p| match p.target {
            PaymentTarget::Fine(fine_id) => !fine_ids.contains(&fine_id),
            PaymentTarget::Order(_) => true,
        });
        counts.payments = before - self.payments.len();

        let before = self.fines.len();
        self.fines.retain(|id, _| !fine_ids.contains(id));
        counts.fines = before - self.fines.len();

        let before = self.reservations.len();
        self.reservations.retain(|_, r| !touches(r.copy_id, r.book_id));
        counts.reservations = before - self.reservations.len();

        let before = self.borrowings.len();
        self.borrowings.retain(|id, _| !borrowing_ids.contains(id));
        counts.borrowings = before - self.borrowings.len();

        let before = self.copies.len();
        self.copies.retain(|_, c| c.book_id != book_id);
        counts.copies = before - self.copies.len();

        let before = self.reviews.len();
        self.reviews.retain(|_, r| r.book_id != book_id);
        counts.reviews = before - self.reviews.len();

        self.books.remove(&book_id);
        tracing::info!(book_id, ?counts, "book removed");
        Ok(counts)
    }

    /// Drops sessions that expired before `now`.
    pub fn purge_sessions(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        before - self.sessions.len()
    }
}

// Integrity checks.
impl Ledger {
    /// Reports every disagreement between copy status and the borrowings and
    /// reservations that reference the copy.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<Violation> {
        let mut findings = Vec::new();

        for copy in self.copies.values() {
            let active_loans = self
                .borrowings
                .values()
                .filter(|b| b.copy_id == copy.id && b.status == BorrowingStatus::Active)
                .count();
            let active_holds = self
                .reservations
                .values()
                .filter(|r| r.copy_id == copy.id && r.status == ReservationStatus::Active)
                .count();

            let expected = match copy.status {
                CopyStatus::Borrowed => (1, 0),
                CopyStatus::Reserved => (0, 1),
                _ => (0, 0),
            };
            if (active_loans, active_holds) != expected {
                findings.push(Violation {
                    subject: format!("copy {}", copy.id),
                    message: format!(
                        "status {} with {} active borrowing(s) and {} active reservation(s)",
                        copy.status, active_loans, active_holds
                    ),
                });
            }
            if !self.books.contains_key(&copy.book_id) {
                findings.push(Violation {
                    subject: format!("copy {}", copy.id),
                    message: format!("references missing book {}", copy.book_id),
                });
            }
        }

        for borrowing in self.borrowings.values() {
            if let Err(err) = borrowing.validate() {
                findings.push(Violation {
                    subject: format!("borrowing {}", borrowing.id),
                    message: err.to_string(),
                });
            }
            let fines = self
                .fines
                .values()
                .filter(|f| f.borrowing_id == borrowing.id)
                .count();
            if fines > 1 {
                findings.push(Violation {
                    subject: format!("borrowing {}", borrowing.id),
                    message: format!("has {fines} fines"),
                });
            }
        }

        findings
    }
}
