// Rust guideline compliant 2026-10-16

//! `libris accountant` commands: fines and the payment ledger.

use crate::commands::Context;
use crate::output::{maybe_timestamp, timestamp, yes_no, Listing, Message};
use anyhow::Result;
use libris_app::list::parse_fine_filter;
use libris_app::{payments, FineFilter, FineView, PayOutcome};
use libris_core::PaymentTarget;

pub(crate) fn fine_listing(fines: &[FineView]) -> serde_json::Result<Listing> {
    Ok(Listing::new(
        &["ID", "Amount", "Date", "Borrowing", "Reader", "Book", "Paid"],
        fines,
        |f| {
            vec![
                f.id.to_string(),
                f.amount.to_string(),
                timestamp(f.fine_date),
                f.borrowing_id.to_string(),
                f.reader_name.clone(),
                f.book_title.clone(),
                yes_no(f.paid).to_string(),
            ]
        },
    )?
    .empty_text("No fines."))
}

fn target_label(target: PaymentTarget) -> String {
    match target {
        PaymentTarget::Fine(id) => format!("fine {id}"),
        PaymentTarget::Order(id) => format!("order {id}"),
    }
}

pub(crate) fn emit_pay_outcome(ctx: &Context, outcome: &PayOutcome, what: &str) -> Result<()> {
    let text = match outcome {
        PayOutcome::Paid { payment } => format!(
            "Paid {what}: payment {} of {} by {}",
            payment.id, payment.amount, payment.method
        ),
        PayOutcome::AlreadyPaid => format!("{what} is already paid; nothing recorded"),
    };
    ctx.emit_message(&Message::new(text, serde_json::to_value(outcome)?));
    Ok(())
}

/// Lists fines, optionally by paid state.
///
/// # Errors
///
/// Returns an error for an unknown status or unless signed in as
/// ACCOUNTANT.
pub fn fines(ctx: &Context, status: Option<&str>) -> Result<()> {
    let filter = match status {
        Some(status) => parse_fine_filter(status)?,
        None => FineFilter::All,
    };
    let library = ctx.open()?;
    let fines = payments::list_fines(&library, filter)?;
    ctx.emit_list(&fine_listing(&fines)?);
    Ok(())
}

/// Records payment of a fine at the desk.
///
/// # Errors
///
/// Returns an error if the fine does not exist.
pub fn pay_fine(ctx: &Context, fine_id: u64, method: Option<&str>) -> Result<()> {
    let library = ctx.open()?;
    let outcome = payments::collect_fine(&library, fine_id, method)?;
    emit_pay_outcome(ctx, &outcome, &format!("fine {fine_id}"))
}

/// Lists payments, newest first.
///
/// # Errors
///
/// Returns an error unless signed in as ACCOUNTANT.
pub fn payments(ctx: &Context) -> Result<()> {
    let library = ctx.open()?;
    let rows = payments::list_payments(&library)?;
    let listing = Listing::new(
        &["ID", "For", "Amount", "Method", "Status", "Reader", "Paid at"],
        &rows,
        |p| {
            vec![
                p.payment.id.to_string(),
                target_label(p.payment.target),
                p.payment.amount.to_string(),
                p.payment.method.clone(),
                p.payment.status.to_string(),
                p.reader_name.clone(),
                maybe_timestamp(p.payment.paid_at),
            ]
        },
    )?
    .empty_text("No payments.");
    ctx.emit_list(&listing);
    Ok(())
}
