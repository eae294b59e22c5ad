// Rust guideline compliant 2026-10-15

//! Circulation desk: lending, returns and the reader's loan history.

use crate::catalog::BookSummary;
use crate::error::{AppError, Result};
use crate::library::Library;
use crate::list::{filter_rows, matches_search};
use crate::time::period_end;
use chrono::{DateTime, Utc};
use libris_core::{
    Book, BookCopy, Borrowing, BorrowingStatus, CopyStatus, Fine, Ledger, OrderStatus, Role,
};
use serde::Serialize;

/// Row limit for the desk copy listing and issue candidates.
pub const COPY_LIST_LIMIT: usize = 200;
/// Row limit for a reader's loan history.
pub const BORROW_LIST_LIMIT: usize = 120;

/// A shelf or lent copy as seen from the desk.
#[derive(Debug, Clone, Serialize)]
pub struct DeskCopy {
    /// Copy id.
    pub copy_id: u64,
    /// Book id.
    pub book_id: u64,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Genre.
    pub genre: String,
    /// AVAILABLE or BORROWED.
    pub status: CopyStatus,
    /// Borrower, when lent.
    pub reader_id: Option<u64>,
    /// Lending time, when lent.
    pub borrow_date: Option<DateTime<Utc>>,
    /// Due time, when lent.
    pub due_date: Option<DateTime<Utc>>,
}

/// A copy that may be handed out for a book.
#[derive(Debug, Clone, Serialize)]
pub struct IssueCandidate {
    /// Copy id.
    pub copy_id: u64,
    /// AVAILABLE, or RESERVED for the given reader.
    pub status: CopyStatus,
}

/// A borrowing joined with its book, as the reader sees it.
#[derive(Debug, Clone, Serialize)]
pub struct BorrowView {
    /// The borrowing.
    #[serde(flatten)]
    pub borrowing: Borrowing,
    /// Title of the borrowed book.
    pub title: String,
    /// Author of the borrowed book.
    pub author: String,
    /// Whether the due date has passed on an ACTIVE loan.
    pub overdue: bool,
    /// Fine assessed at return, if any.
    pub fine_amount: Option<i64>,
}

/// Result of a return.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnOutcome {
    /// The closed borrowing.
    pub borrowing: Borrowing,
    /// Overdue fine assessed by this return.
    pub fine: Option<Fine>,
    /// Order moved to COMPLETED by this return.
    pub completed_order: Option<u64>,
}

pub(crate) fn borrow_view(ledger: &Ledger, b: &Borrowing, now: DateTime<Utc>) -> BorrowView {
    let book = ledger.books.get(&b.book_id);
    BorrowView {
        borrowing: b.clone(),
        title: book.map(|bk| bk.title.clone()).unwrap_or_default(),
        author: book.map(|bk| bk.author.clone()).unwrap_or_default(),
        overdue: b.status == BorrowingStatus::Active && b.due_date < now,
        fine_amount: ledger.fine_for_borrowing(b.id).map(|f| f.amount),
    }
}

fn desk_row(ledger: &Ledger, copy: &BookCopy, book: &Book) -> DeskCopy {
    let loan = ledger.active_borrowing_for_copy(copy.id);
    DeskCopy {
        copy_id: copy.id,
        book_id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        genre: book.genre.clone(),
        status: copy.status,
        reader_id: loan.map(|b| b.reader_id),
        borrow_date: loan.map(|b| b.borrow_date),
        due_date: loan.map(|b| b.due_date),
    }
}

/// Searches the catalog from the desk, newest book first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN.
pub fn search_books(library: &Library, search: Option<&str>) -> Result<Vec<BookSummary>> {
    let needle = search.unwrap_or_default().to_string();
    library.read_as(Role::Librarian, |ledger, _, _| {
        let books: Vec<&Book> = ledger.books.values().rev().collect();
        Ok(filter_rows(books, |b| {
            matches_search(&needle, &[b.title.as_str(), b.author.as_str()])
        })
        .into_iter()
        .take(COPY_LIST_LIMIT)
        .map(|b| BookSummary::build(ledger, b))
        .collect())
    })
}

/// Lists AVAILABLE and BORROWED copies with their current loan.
///
/// # Arguments
///
/// * `search` - Case-insensitive substring of title or author
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN.
pub fn available_copies(library: &Library, search: Option<&str>) -> Result<Vec<DeskCopy>> {
    let needle = search.unwrap_or_default().to_string();
    library.read_as(Role::Librarian, |ledger, _, _| {
        let copies: Vec<(&BookCopy, &Book)> = ledger
            .copies()
            .filter(|c| matches!(c.status, CopyStatus::Available | CopyStatus::Borrowed))
            .filter_map(|c| ledger.books.get(&c.book_id).map(|b| (c, b)))
            .collect();
        Ok(filter_rows(copies, |(_, book)| {
            matches_search(&needle, &[book.title.as_str(), book.author.as_str()])
        })
        .into_iter()
        .take(COPY_LIST_LIMIT)
        .map(|(copy, book)| desk_row(ledger, copy, book))
        .collect())
    })
}

/// Copies the desk may hand out for a book.
///
/// With `reader_id`, copies held for that reader are included.
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN, and a not-found
/// error for an unknown book.
pub fn issue_candidates(
    library: &Library,
    book_id: u64,
    reader_id: Option<u64>,
) -> Result<Vec<IssueCandidate>> {
    library.read_as(Role::Librarian, |ledger, _, now| {
        ledger.book(book_id)?;
        Ok(ledger
            .issue_candidates(book_id, reader_id, now)
            .into_iter()
            .map(|copy| IssueCandidate {
                copy_id: copy.id,
                status: copy.status,
            })
            .collect())
    })
}

/// Lends a copy to a reader.
///
/// # Arguments
///
/// * `reader_id` - Borrowing reader
/// * `copy_id` - Copy to lend
/// * `days` - Loan length; the configured default when `None` or zero
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a loan longer than
/// `max_loan_days`, a not-found error for an unknown reader or copy, and a
/// transition error if the copy is not AVAILABLE and not held for this
/// reader.
pub fn borrow(
    library: &Library,
    reader_id: u64,
    copy_id: u64,
    days: Option<u32>,
) -> Result<Borrowing> {
    let days = days
        .filter(|d| *d > 0)
        .unwrap_or(library.config().default_loan_days);
    let max = library.config().max_loan_days;

    library.transaction_as(Role::Librarian, |ledger, actor, now| {
        let due = period_end(now, days, max, "Loan length")?;
        let is_reader = ledger
            .users
            .get(&reader_id)
            .is_some_and(|u| u.role == Role::Reader);
        if !is_reader {
            return Err(AppError::not_found("Reader"));
        }
        ledger.copy(copy_id)?;

        let id = ledger.issue_copy(reader_id, copy_id, None, due, now)?;
        tracing::debug!(borrowing_id = id, by = actor.user_id, "desk loan recorded");
        ledger
            .borrowings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Borrowing"))
    })
}

/// Takes a copy back, assessing any overdue fine.
///
/// When the loan came from an order whose loans are now all returned, the
/// order moves to COMPLETED.
///
/// # Errors
///
/// Returns a not-found error if the copy has no active borrowing.
pub fn return_copy(library: &Library, copy_id: u64) -> Result<ReturnOutcome> {
    let rate = library.config().fine_rate_per_day;

    library.transaction_as(Role::Librarian, |ledger, _, now| {
        let borrowing_id = ledger.return_copy(copy_id, now)?;
        let fine = ledger
            .assess_fine(borrowing_id, rate, now)
            .and_then(|id| ledger.fines.get(&id).cloned());
        let borrowing = ledger
            .borrowings
            .get(&borrowing_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Borrowing"))?;
        let completed_order = match borrowing.order_id {
            Some(order_id) => complete_order_if_returned(ledger, order_id)?,
            None => None,
        };

        Ok(ReturnOutcome {
            borrowing,
            fine,
            completed_order,
        })
    })
}

fn complete_order_if_returned(ledger: &mut Ledger, order_id: u64) -> Result<Option<u64>> {
    let all_returned = ledger
        .order_borrowings(order_id)
        .iter()
        .all(|b| b.status == BorrowingStatus::Returned);
    let Some(order) = ledger.orders.get_mut(&order_id) else {
        return Ok(None);
    };
    if !all_returned || order.status != OrderStatus::Borrowed {
        return Ok(None);
    }
    order.status.can_transition_to(OrderStatus::Completed)?;
    order.status = OrderStatus::Completed;
    tracing::info!(order_id, "order completed");
    Ok(Some(order_id))
}

/// The signed-in reader's loans, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn reader_borrows(library: &Library, active_only: bool) -> Result<Vec<BorrowView>> {
    library.read_as(Role::Reader, |ledger, actor, now| {
        let mut loans: Vec<&Borrowing> = ledger
            .borrowings
            .values()
            .filter(|b| b.reader_id == actor.user_id)
            .filter(|b| !active_only || b.status == BorrowingStatus::Active)
            .collect();
        loans.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date).then(b.id.cmp(&a.id)));

        Ok(loans
            .into_iter()
            .take(BORROW_LIST_LIMIT)
            .map(|b| borrow_view(ledger, b, now))
            .collect())
    })
}
