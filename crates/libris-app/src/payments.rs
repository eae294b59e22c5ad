// Rust guideline compliant 2026-10-15

//! Fines and payments: settlement by readers and the accountant desk.

use crate::error::{AppError, Result};
use crate::library::Library;
use crate::list::{filter_rows, FineFilter};
use chrono::{DateTime, Utc};
use libris_core::{
    Fine, Ledger, Payment, PaymentState, PaymentStatus, PaymentTarget, Role, User,
};
use serde::Serialize;

/// Row limit for the accountant fine and payment listings.
pub const DESK_LIST_LIMIT: usize = 200;
/// Row limit for a reader's fine list.
pub const READER_FINE_LIMIT: usize = 120;

/// Method recorded for reader self-service payments.
pub const MOCK_METHOD: &str = "MOCK";
/// Default method at the accountant desk.
pub const CASH_METHOD: &str = "CASH";

/// Result of a payment request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayOutcome {
    /// A new PAID payment was recorded.
    Paid {
        /// The payment.
        payment: Payment,
    },
    /// The target was already settled; nothing was recorded.
    AlreadyPaid,
}

/// A fine joined with its reader and book.
#[derive(Debug, Clone, Serialize)]
pub struct FineView {
    /// Fine id.
    pub id: u64,
    /// Amount in minor units.
    pub amount: i64,
    /// Assessment time.
    pub fine_date: DateTime<Utc>,
    /// Penalized borrowing.
    pub borrowing_id: u64,
    /// Whether a PAID payment exists.
    pub paid: bool,
    /// Reader display name.
    pub reader_name: String,
    /// Reader email.
    pub reader_email: String,
    /// Title of the borrowed book.
    pub book_title: String,
}

/// A payment joined with the paying reader.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    /// The payment.
    #[serde(flatten)]
    pub payment: Payment,
    /// Paying reader's name.
    pub reader_name: String,
    /// Paying reader's email.
    pub reader_email: String,
}

pub(crate) fn fine_reader<'a>(ledger: &'a Ledger, fine: &Fine) -> Option<&'a User> {
    let borrowing = ledger.borrowings.get(&fine.borrowing_id)?;
    ledger.users.get(&borrowing.reader_id)
}

pub(crate) fn fine_view(ledger: &Ledger, fine: &Fine) -> FineView {
    let reader = fine_reader(ledger, fine);
    let book_title = ledger
        .borrowings
        .get(&fine.borrowing_id)
        .and_then(|b| ledger.books.get(&b.book_id))
        .map(|b| b.title.clone())
        .unwrap_or_default();
    FineView {
        id: fine.id,
        amount: fine.amount,
        fine_date: fine.fine_date,
        borrowing_id: fine.borrowing_id,
        paid: ledger.is_fine_paid(fine.id),
        reader_name: reader.map(|u| u.name.clone()).unwrap_or_default(),
        reader_email: reader.map(|u| u.email.clone()).unwrap_or_default(),
        book_title,
    }
}

fn payer<'a>(ledger: &'a Ledger, target: PaymentTarget) -> Option<&'a User> {
    match target {
        PaymentTarget::Fine(id) => ledger.fines.get(&id).and_then(|f| fine_reader(ledger, f)),
        PaymentTarget::Order(id) => ledger
            .orders
            .get(&id)
            .and_then(|o| ledger.users.get(&o.reader_id)),
    }
}

fn normalize_method(method: Option<&str>, default: &str) -> String {
    method
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
        .to_uppercase()
}

fn record_payment(
    ledger: &mut Ledger,
    target: PaymentTarget,
    amount: i64,
    method: String,
    now: DateTime<Utc>,
) -> Payment {
    let id = ledger.next_payment_id();
    let payment = Payment {
        id,
        target,
        amount,
        method,
        status: PaymentStatus::Paid,
        created_at: now,
        paid_at: Some(now),
    };
    tracing::info!(payment_id = id, ?target, amount, method = %payment.method, "payment recorded");
    ledger.payments.insert(id, payment.clone());
    payment
}

/// Pays one of the caller's orders.
///
/// # Arguments
///
/// * `method` - Payment method, `MOCK` when absent
///
/// # Errors
///
/// Returns a not-found error unless the order belongs to the caller.
pub fn pay_order(library: &Library, order_id: u64, method: Option<&str>) -> Result<PayOutcome> {
    let method = normalize_method(method, MOCK_METHOD);
    library.transaction_as(Role::Reader, |ledger, actor, now| {
        let order = ledger
            .orders
            .get(&order_id)
            .filter(|o| o.reader_id == actor.user_id)
            .ok_or_else(|| AppError::not_found("Order"))?;
        if order.payment_status == PaymentState::Paid {
            return Ok(PayOutcome::AlreadyPaid);
        }
        let amount = order.total_fee + order.total_deposit;

        let payment = record_payment(ledger, PaymentTarget::Order(order_id), amount, method, now);
        if let Some(order) = ledger.orders.get_mut(&order_id) {
            order.payment_status = PaymentState::Paid;
        }
        Ok(PayOutcome::Paid { payment })
    })
}

fn settle_fine(
    ledger: &mut Ledger,
    fine_id: u64,
    method: String,
    now: DateTime<Utc>,
) -> Result<PayOutcome> {
    let amount = ledger
        .fines
        .get(&fine_id)
        .map(|f| f.amount)
        .ok_or_else(|| AppError::not_found("Fine"))?;
    if ledger.is_fine_paid(fine_id) {
        return Ok(PayOutcome::AlreadyPaid);
    }
    let payment = record_payment(ledger, PaymentTarget::Fine(fine_id), amount, method, now);
    Ok(PayOutcome::Paid { payment })
}

/// Collects a fine at the accountant desk.
///
/// # Arguments
///
/// * `method` - Payment method, `CASH` when absent
///
/// # Errors
///
/// Returns a not-found error for an unknown fine.
pub fn collect_fine(library: &Library, fine_id: u64, method: Option<&str>) -> Result<PayOutcome> {
    let method = normalize_method(method, CASH_METHOD);
    library.transaction_as(Role::Accountant, |ledger, _, now| {
        settle_fine(ledger, fine_id, method, now)
    })
}

/// Pays one of the caller's own fines online.
///
/// # Errors
///
/// Returns a not-found error unless the fine penalizes one of the caller's
/// borrowings.
pub fn pay_my_fine(library: &Library, fine_id: u64) -> Result<PayOutcome> {
    library.transaction_as(Role::Reader, |ledger, actor, now| {
        let own = ledger
            .fines
            .get(&fine_id)
            .and_then(|f| fine_reader(ledger, f))
            .is_some_and(|u| u.id == actor.user_id);
        if !own {
            return Err(AppError::not_found("Fine"));
        }
        settle_fine(ledger, fine_id, MOCK_METHOD.to_string(), now)
    })
}

/// Fines for the accountant desk, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is an ACCOUNTANT.
pub fn list_fines(library: &Library, filter: FineFilter) -> Result<Vec<FineView>> {
    library.read_as(Role::Accountant, |ledger, _, _| {
        let mut fines: Vec<&Fine> = ledger.fines.values().collect();
        fines.sort_by(|a, b| b.fine_date.cmp(&a.fine_date).then(b.id.cmp(&a.id)));
        let views: Vec<FineView> = fines
            .into_iter()
            .take(DESK_LIST_LIMIT)
            .map(|f| fine_view(ledger, f))
            .collect();
        Ok(filter_rows(views, |v| match filter {
            FineFilter::All => true,
            FineFilter::Paid => v.paid,
            FineFilter::Unpaid => !v.paid,
        }))
    })
}

/// The caller's fines, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn my_fines(library: &Library) -> Result<Vec<FineView>> {
    library.read_as(Role::Reader, |ledger, actor, _| {
        let mut fines: Vec<&Fine> = ledger
            .fines
            .values()
            .filter(|f| fine_reader(ledger, f).is_some_and(|u| u.id == actor.user_id))
            .collect();
        fines.sort_by(|a, b| b.fine_date.cmp(&a.fine_date).then(b.id.cmp(&a.id)));
        Ok(fines
            .into_iter()
            .take(READER_FINE_LIMIT)
            .map(|f| fine_view(ledger, f))
            .collect())
    })
}

/// Every payment, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is an ACCOUNTANT.
pub fn list_payments(library: &Library) -> Result<Vec<PaymentView>> {
    library.read_as(Role::Accountant, |ledger, _, _| {
        let mut payments: Vec<&Payment> = ledger.payments.values().collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(payments
            .into_iter()
            .take(DESK_LIST_LIMIT)
            .map(|p| {
                let user = payer(ledger, p.target);
                PaymentView {
                    payment: p.clone(),
                    reader_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    reader_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect())
    })
}
