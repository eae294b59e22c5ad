// Rust guideline compliant 2026-10-16

//! `libris librarian` commands: the circulation desk and order handling.

use crate::commands::accountant::fine_listing;
use crate::commands::admin::book_listing;
use crate::commands::reader::profile_record;
use crate::commands::{parse_id_pair, Context};
use crate::output::{maybe_timestamp, or_dash, timestamp, Listing, Message, Record};
use anyhow::Result;
use libris_app::list::parse_order_status;
use libris_app::{catalog, circulation, orders, readers, IssueOutcome, OrderView};
use libris_core::{Allocation, Borrowing};

pub(crate) fn borrowing_listing(borrowings: &[Borrowing]) -> serde_json::Result<Listing> {
    Listing::new(
        &["ID", "Reader", "Copy", "Book", "Borrowed", "Due", "Status"],
        borrowings,
        |b| {
            vec![
                b.id.to_string(),
                b.reader_id.to_string(),
                b.copy_id.to_string(),
                b.book_id.to_string(),
                timestamp(b.borrow_date),
                timestamp(b.due_date),
                b.status.to_string(),
            ]
        },
    )
}

fn borrowing_record(borrowing: &Borrowing) -> serde_json::Result<Record> {
    Ok(Record::new(borrowing)?
        .field("Borrowing", borrowing.id)
        .field("Reader", borrowing.reader_id)
        .field("Copy", borrowing.copy_id)
        .field("Book", borrowing.book_id)
        .optional("Order", borrowing.order_id)
        .field("Borrowed", timestamp(borrowing.borrow_date))
        .field("Due", timestamp(borrowing.due_date))
        .optional("Returned", borrowing.return_date.map(timestamp))
        .field("Status", borrowing.status))
}

pub(crate) fn order_listing(orders: &[OrderView]) -> serde_json::Result<Listing> {
    Ok(Listing::new(
        &["ID", "Reader", "Status", "Payment", "Items", "Loan days", "Created"],
        orders,
        |o| {
            let copies: u32 = o.items.iter().map(|i| i.quantity).sum();
            vec![
                o.id.to_string(),
                o.reader_name.clone(),
                o.status.to_string(),
                o.payment_status.to_string(),
                format!("{} lines / {} copies", o.items.len(), copies),
                o.loan_days.to_string(),
                timestamp(o.created_at),
            ]
        },
    )?
    .empty_text("No orders found."))
}

pub(crate) fn order_record(order: &OrderView) -> serde_json::Result<Record> {
    let items = order
        .items
        .iter()
        .map(|i| format!("#{} {} x{} (book {})", i.id, i.title, i.quantity, i.book_id))
        .collect::<Vec<_>>()
        .join("; ");
    Ok(Record::new(order)?
        .field("Order", order.id)
        .field("Reader", format!("{} (id {})", order.reader_name, order.reader_id))
        .field("Status", order.status)
        .field("Payment", order.payment_status)
        .field("Loan days", order.loan_days)
        .optional("Note", order.note.as_deref())
        .field("Pickup by", maybe_timestamp(order.pickup_expires_at))
        .field("Issued", maybe_timestamp(order.issued_at))
        .field("Created", timestamp(order.created_at))
        .field("Items", items))
}

/// Searches the catalog from the desk.
///
/// # Errors
///
/// Returns an error unless signed in as LIBRARIAN.
pub fn books(ctx: &Context, search: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let books = circulation::search_books(&library, search)?;
    ctx.emit_list(&book_listing(&books)?);
    Ok(())
}

/// Lists shelf and lent copies.
///
/// # Errors
///
/// Returns an error unless signed in as LIBRARIAN.
pub fn copies(ctx: &Context, search: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let rows = circulation::available_copies(&library, search)?;
    let listing = Listing::new(
        &["Copy", "Book", "Title", "Author", "Status", "Reader", "Due"],
        &rows,
        |c| {
            vec![
                c.copy_id.to_string(),
                c.book_id.to_string(),
                c.title.clone(),
                c.author.clone(),
                c.status.to_string(),
                or_dash(c.reader_id),
                maybe_timestamp(c.due_date),
            ]
        },
    )?
    .empty_text("No copies found.");
    ctx.emit_list(&listing);
    Ok(())
}

/// Lists copies of a book that may be handed out.
///
/// # Errors
///
/// Returns an error if the book does not exist.
pub fn issue_candidates(ctx: &Context, book_id: u64, reader_id: Option<u64>) -> Result<()> {
    let library = ctx.open()?;
    let rows = circulation::issue_candidates(&library, book_id, reader_id)?;
    let listing = Listing::new(&["Copy", "Status"], &rows, |c| {
        vec![c.copy_id.to_string(), c.status.to_string()]
    })?
    .empty_text("No copy can be issued.");
    ctx.emit_list(&listing);
    Ok(())
}

/// Lends a copy to a reader at the desk.
///
/// # Errors
///
/// Returns an error if the reader or copy is unknown or the copy cannot be
/// lent.
pub fn borrow(ctx: &Context, reader_id: u64, copy_id: u64, days: Option<u32>) -> Result<()> {
    let library = ctx.open()?;
    let borrowing = circulation::borrow(&library, reader_id, copy_id, days)?;
    ctx.emit_record(&borrowing_record(&borrowing)?);
    Ok(())
}

/// Takes a copy back, assessing any overdue fine.
///
/// # Errors
///
/// Returns an error if the copy has no active loan.
pub fn return_copy(ctx: &Context, copy_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let outcome = circulation::return_copy(&library, copy_id)?;
    let b = &outcome.borrowing;
    let mut record = Record::new(&outcome)?
        .field("Borrowing", b.id)
        .field("Copy", b.copy_id)
        .field("Reader", b.reader_id)
        .field("Due", timestamp(b.due_date))
        .field("Returned", maybe_timestamp(b.return_date));
    record = match &outcome.fine {
        Some(fine) => record.field("Fine", format!("{} (fine {})", fine.amount, fine.id)),
        None => record.field("Fine", "none"),
    };
    record = record.optional("Order completed", outcome.completed_order);
    ctx.emit_record(&record);
    Ok(())
}

/// Moves a copy through lost, damaged or restore.
///
/// # Errors
///
/// Returns an error for an unknown action or a transition the copy does not
/// allow.
pub fn mark_copy(ctx: &Context, copy_id: u64, action: &str) -> Result<()> {
    let library = ctx.open()?;
    let change = catalog::mark_copy(&library, copy_id, action)?;
    ctx.emit_message(&Message::new(
        format!("Copy {}: {} -> {}", change.copy_id, change.from, change.to),
        serde_json::to_value(&change)?,
    ));
    Ok(())
}

/// Lists orders, optionally by status.
///
/// # Errors
///
/// Returns an error for an unknown status.
pub fn orders_list(ctx: &Context, status: Option<&str>) -> Result<()> {
    let status = status.map(parse_order_status).transpose()?;
    let library = ctx.open()?;
    let orders = orders::list_orders(&library, status)?;
    ctx.emit_list(&order_listing(&orders)?);
    Ok(())
}

/// Approves a pending order.
///
/// # Errors
///
/// Returns an error if the order is not PENDING.
pub fn orders_approve(ctx: &Context, order_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let order = orders::approve_order(&library, order_id)?;
    ctx.emit_record(&order_record(&order)?);
    Ok(())
}

/// Cancels a pending or approved order.
///
/// # Errors
///
/// Returns an error if the order can no longer be cancelled.
pub fn orders_cancel(ctx: &Context, order_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let order = orders::cancel_order(&library, order_id)?;
    ctx.emit_record(&order_record(&order)?);
    Ok(())
}

fn emit_issue(ctx: &Context, outcome: &IssueOutcome) -> Result<()> {
    let listing = borrowing_listing(&outcome.borrowings)?.with_json(serde_json::to_value(outcome)?);
    ctx.emit_list(&listing);
    Ok(())
}

/// Issues an approved order with automatically picked copies.
///
/// # Errors
///
/// Returns an error if the order is not APPROVED or copies are short.
pub fn orders_issue(ctx: &Context, order_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let outcome = orders::issue_order(&library, order_id)?;
    emit_issue(ctx, &outcome)
}

/// Parses `ITEM:COPY` allocation arguments.
///
/// # Errors
///
/// Returns an error for a malformed pair.
pub fn parse_allocations(values: &[String]) -> libris_app::Result<Vec<Allocation>> {
    values
        .iter()
        .map(|value| {
            let (order_item_id, copy_id) = parse_id_pair(value, "allocation")?;
            Ok(Allocation {
                order_item_id,
                copy_id,
            })
        })
        .collect()
}

/// Issues an approved order with librarian-chosen copies.
///
/// # Errors
///
/// Returns an error if an allocation is malformed or rejected.
pub fn orders_issue_by_copies(ctx: &Context, order_id: u64, allocations: &[String]) -> Result<()> {
    let allocations = parse_allocations(allocations)?;
    let library = ctx.open()?;
    let outcome = orders::issue_by_copies(&library, order_id, &allocations)?;
    emit_issue(ctx, &outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allocations() {
        let parsed = parse_allocations(&["1:10".to_string(), "2:11".to_string()]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!((parsed[1].order_item_id, parsed[1].copy_id), (2, 11));

        let err = parse_allocations(&["1:10".to_string(), "oops".to_string()]).unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}

/// Lists readers, newest registration first.
///
/// # Errors
///
/// Returns an error unless signed in as LIBRARIAN.
pub fn readers_list(ctx: &Context, search: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let rows = readers::list_readers(&library, search)?;
    let listing = Listing::new(
        &["ID", "Name", "Email", "Phone", "Registered"],
        &rows,
        |r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.email.clone(),
                or_dash(r.phone.as_deref()),
                timestamp(r.registered_at),
            ]
        },
    )?
    .empty_text("No readers found.");
    ctx.emit_list(&listing);
    Ok(())
}

/// Shows a reader's profile, then their loans and fines.
///
/// # Errors
///
/// Returns an error if `reader_id` is not a reader.
pub fn readers_show(ctx: &Context, reader_id: u64) -> Result<()> {
    let library = ctx.open()?;
    let detail = readers::show_reader(&library, reader_id)?;
    if ctx.formatter().is_json() {
        let record = profile_record(&detail.profile)?.with_json(serde_json::to_value(&detail)?);
        ctx.emit_record(&record);
        return Ok(());
    }
    ctx.emit_record(&profile_record(&detail.profile)?);
    let loans = Listing::new(
        &["ID", "Title", "Copy", "Borrowed", "Due", "Returned", "Status"],
        &detail.borrowings,
        |l| {
            vec![
                l.borrowing.id.to_string(),
                l.title.clone(),
                l.borrowing.copy_id.to_string(),
                timestamp(l.borrowing.borrow_date),
                timestamp(l.borrowing.due_date),
                maybe_timestamp(l.borrowing.return_date),
                l.borrowing.status.to_string(),
            ]
        },
    )?
    .empty_text("No loans.");
    ctx.emit_list(&loans);
    ctx.emit_list(&fine_listing(&detail.fines)?);
    Ok(())
}
