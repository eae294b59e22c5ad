// Rust guideline compliant 2026-10-16

//! `libris reader` commands: browsing, holds, orders, loans and fines.

use crate::commands::accountant::{emit_pay_outcome, fine_listing};
use crate::commands::admin::{book_listing, book_record};
use crate::commands::librarian::{order_listing, order_record};
use crate::commands::Context;
use crate::output::{maybe_timestamp, or_dash, timestamp, yes_no, Listing, Message, Record};
use anyhow::Result;
use libris_app::orders::{self, CartLine, NewOrder};
use libris_app::readers::{self, ProfileUpdate, ReaderProfile};
use libris_app::{catalog, circulation, payments, reservations, AppError, BrowseQuery, ReservationView};
use serde_json::json;

pub(crate) fn profile_record(profile: &ReaderProfile) -> serde_json::Result<Record> {
    Ok(Record::new(profile)?
        .field("Reader", profile.id)
        .field("Name", &profile.name)
        .field("Email", &profile.email)
        .field("Phone", or_dash(profile.phone.as_deref()))
        .field("Address", or_dash(profile.address.as_deref().filter(|a| !a.is_empty())))
        .field("Gender", or_dash(profile.gender.as_deref()))
        .field("Born", or_dash(profile.birth_date))
        .field("Registered", timestamp(profile.registered_at)))
}

fn reservation_record(hold: &ReservationView) -> serde_json::Result<Record> {
    Ok(Record::new(hold)?
        .field("Reservation", hold.id)
        .field("Book", format!("{} (id {})", hold.title, hold.book_id))
        .field("Copy", hold.copy_id)
        .field("Status", hold.status)
        .field("Created", timestamp(hold.created_at))
        .field("Expires", timestamp(hold.expires_at)))
}

/// Browses the catalog one page at a time.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn books_list(ctx: &Context, query: &BrowseQuery) -> Result<()> {
    let library = ctx.open()?;
    let page = catalog::browse_books(&library, query)?;
    let listing = book_listing(&page.items)?.with_json(serde_json::to_value(&page)?);
    ctx.emit_list(&listing);
    if !ctx.formatter().is_json() && page.total > 0 {
        println!(
            "Page {} of {} ({} books)",
            page.page, page.total_pages, page.total
        );
    }
    Ok(())
}

/// Shows a book with its copies.
///
/// # Errors
///
/// Returns an error if the book does not exist.
pub fn books_show(ctx: &Context, book_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let detail = catalog::book_detail(&library, book_id)?;
    let copies = detail
        .copies
        .iter()
        .map(|c| format!("{}:{}", c.id, c.status))
        .collect::<Vec<_>>()
        .join(" ");
    let reviews = detail
        .reviews
        .iter()
        .map(|r| match &r.comment {
            Some(comment) => format!("{}/5 {}: {comment}", r.rating, r.reader_name),
            None => format!("{}/5 {}", r.rating, r.reader_name),
        })
        .collect::<Vec<_>>();
    let record = book_record(&detail.summary)?
        .with_json(serde_json::to_value(&detail)?)
        .field("Copy list", if copies.is_empty() { "-".to_string() } else { copies })
        .field("Reviews", or_dash(Some(reviews.join("; ")).filter(|s| !s.is_empty())));
    ctx.emit_record(&record);
    Ok(())
}

/// Rates a book, replacing any earlier review by the reader.
///
/// # Errors
///
/// Returns an error for a rating outside 1..=5 or an unknown book.
pub fn review(ctx: &Context, book_id: u64, rating: u8, comment: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let review = catalog::review_book(&library, book_id, rating, comment)?;
    let record = Record::new(&review)?
        .field("Review", review.id)
        .field("Book", review.book_id)
        .field("Rating", format!("{}/5", review.rating))
        .optional("Comment", review.comment.as_deref())
        .field("Updated", timestamp(review.updated_at));
    ctx.emit_record(&record);
    Ok(())
}

/// Shows the reader's own profile.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn profile_show(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let profile = readers::my_profile(&library)?;
    ctx.emit_record(&profile_record(&profile)?);
    Ok(())
}

/// Updates the reader's own profile.
///
/// # Errors
///
/// Returns an error for an invalid birth date or an empty name.
pub fn profile_update(ctx: &Context, update: ProfileUpdate) -> Result<()> {
    let library = ctx.open()?;
    let profile = readers::update_my_profile(&library, update)?;
    ctx.emit_record(&profile_record(&profile)?);
    Ok(())
}

/// Holds an available copy of a book.
///
/// # Errors
///
/// Returns an error if the book does not exist or has no AVAILABLE copy.
pub fn reserve(ctx: &Context, book_id: u64, hold_days: Option<u32>) -> Result<()> {
    let library = ctx.open()?;
    let hold = reservations::reserve(&library, book_id, hold_days)?;
    ctx.emit_record(&reservation_record(&hold)?);
    Ok(())
}

/// Lists the reader's reservations.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn reservations(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let holds = reservations::my_reservations(&library)?;
    let listing = Listing::new(
        &["ID", "Book", "Copy", "Status", "Created", "Expires"],
        &holds,
        |h| {
            vec![
                h.id.to_string(),
                h.title.clone(),
                h.copy_id.to_string(),
                h.status.to_string(),
                timestamp(h.created_at),
                timestamp(h.expires_at),
            ]
        },
    )?
    .empty_text("No reservations.");
    ctx.emit_list(&listing);
    Ok(())
}

/// Cancels one of the reader's reservations.
///
/// # Errors
///
/// Returns an error if the reservation is not the reader's.
pub fn cancel_reservation(ctx: &Context, reservation_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let cancelled = reservations::cancel_reservation(&library, reservation_id)?;
    let text = if cancelled {
        format!("Reservation {reservation_id} cancelled")
    } else {
        format!("Reservation {reservation_id} was not active; nothing changed")
    };
    ctx.emit_message(&Message::new(
        text,
        json!({ "id": reservation_id, "cancelled": cancelled }),
    ));
    Ok(())
}

/// Parses `BOOK[:QTY]` cart arguments.
///
/// # Errors
///
/// Returns an error for a malformed line.
pub fn parse_cart(values: &[String]) -> libris_app::Result<Vec<CartLine>> {
    values
        .iter()
        .map(|value| {
            let invalid = || AppError::InvalidInput(format!("Invalid cart line: '{value}'"));
            let (book, quantity) = match value.split_once(':') {
                Some((book, quantity)) => {
                    (book, Some(quantity.trim().parse().map_err(|_| invalid())?))
                }
                None => (value.as_str(), None),
            };
            Ok(CartLine {
                book_id: book.trim().parse().map_err(|_| invalid())?,
                quantity,
            })
        })
        .collect()
}

/// Places a borrow order from cart lines.
///
/// # Errors
///
/// Returns an error for an empty cart, an unknown book or too few copies.
pub fn orders_create(
    ctx: &Context,
    items: &[String],
    loan_days: Option<u32>,
    note: Option<String>,
) -> Result<()> {
    let form = NewOrder {
        items: parse_cart(items)?,
        loan_days,
        note,
    };
    let library = ctx.open()?;
    let order = orders::create_order(&library, form)?;
    ctx.emit_record(&order_record(&order)?);
    Ok(())
}

/// Lists the reader's orders.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn orders_list(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let orders = orders::my_orders(&library)?;
    ctx.emit_list(&order_listing(&orders)?);
    Ok(())
}

/// Shows one of the reader's orders with payments and loans.
///
/// # Errors
///
/// Returns an error if the order is not the reader's.
pub fn orders_show(ctx: &Context, order_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let detail = orders::my_order_detail(&library, order_id)?;
    let payments = detail
        .payments
        .iter()
        .map(|p| format!("#{} {} {} {}", p.id, p.method, p.amount, p.status))
        .collect::<Vec<_>>();
    let loans = detail
        .borrowings
        .iter()
        .map(|b| format!("copy {} due {} {}", b.copy_id, timestamp(b.due_date), b.status))
        .collect::<Vec<_>>();
    let record = order_record(&detail.order)?
        .with_json(serde_json::to_value(&detail)?)
        .field("Payments", or_dash(Some(payments.join("; ")).filter(|s| !s.is_empty())))
        .field("Loans", or_dash(Some(loans.join("; ")).filter(|s| !s.is_empty())));
    ctx.emit_record(&record);
    Ok(())
}

/// Pays for one of the reader's orders.
///
/// # Errors
///
/// Returns an error if the order is not the reader's.
pub fn orders_pay(ctx: &Context, order_id: u64, method: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let outcome = payments::pay_order(&library, order_id, method)?;
    emit_pay_outcome(ctx, &outcome, &format!("order {order_id}"))
}

/// Lists the reader's loans.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn borrows(ctx: &Context, active_only: bool) -> Result<()> {
    let library = ctx.open()?;
    let loans = circulation::reader_borrows(&library, active_only)?;
    let listing = Listing::new(
        &["ID", "Title", "Copy", "Borrowed", "Due", "Returned", "Status", "Overdue", "Fine"],
        &loans,
        |l| {
            vec![
                l.borrowing.id.to_string(),
                l.title.clone(),
                l.borrowing.copy_id.to_string(),
                timestamp(l.borrowing.borrow_date),
                timestamp(l.borrowing.due_date),
                maybe_timestamp(l.borrowing.return_date),
                l.borrowing.status.to_string(),
                yes_no(l.overdue).to_string(),
                or_dash(l.fine_amount),
            ]
        },
    )?
    .empty_text("No loans.");
    ctx.emit_list(&listing);
    Ok(())
}

/// Lists the reader's fines.
///
/// # Errors
///
/// Returns an error unless signed in as READER.
pub fn fines(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let fines = payments::my_fines(&library)?;
    ctx.emit_list(&fine_listing(&fines)?);
    Ok(())
}

/// Pays one of the reader's fines.
///
/// # Errors
///
/// Returns an error if the fine is not the reader's.
pub fn pay_fine(ctx: &Context, fine_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let outcome = payments::pay_my_fine(&library, fine_id)?;
    emit_pay_outcome(ctx, &outcome, &format!("fine {fine_id}"))
}
