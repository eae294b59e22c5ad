// Rust guideline compliant 2026-10-15

//! Borrow orders: the reader's cart and the librarian's order queue.

use crate::error::{AppError, Result};
use crate::library::Library;
use crate::list::clamp_or;
use chrono::{DateTime, Utc};
use libris_core::{
    Allocation, BorrowOrder, BorrowOrderItem, Borrowing, Ledger, OrderStatus, Payment,
    PaymentState, PaymentTarget, Role,
};
use serde::{Deserialize, Serialize};

/// Row limit for a reader's order list.
pub const READER_ORDER_LIMIT: usize = 50;
/// Row limit for the librarian order queue.
pub const DESK_ORDER_LIMIT: usize = 80;

/// One cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    /// Requested book.
    pub book_id: u64,
    /// Requested copies; clamped to 1..=`max_item_quantity`.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// A reader's cart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    /// Cart lines. Repeated books stay separate lines.
    pub items: Vec<CartLine>,
    /// Loan length; clamped to 1..=`max_loan_days`.
    #[serde(default)]
    pub loan_days: Option<u32>,
    /// Free-form note.
    #[serde(default)]
    pub note: Option<String>,
}

/// An order line with its book title.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    /// Item id.
    pub id: u64,
    /// Requested book.
    pub book_id: u64,
    /// Title of the book, empty if it was deleted.
    pub title: String,
    /// Requested copies.
    pub quantity: u32,
}

/// An order with reader name and item titles.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    /// Order id.
    pub id: u64,
    /// Requesting reader.
    pub reader_id: u64,
    /// Reader display name.
    pub reader_name: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment state.
    pub payment_status: PaymentState,
    /// Loan length applied at issue.
    pub loan_days: u32,
    /// Reader note.
    pub note: Option<String>,
    /// Service fee.
    pub total_fee: i64,
    /// Refundable deposit.
    pub total_deposit: i64,
    /// Pickup deadline.
    pub pickup_expires_at: Option<DateTime<Utc>>,
    /// Issue time.
    pub issued_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Lines.
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    fn build(ledger: &Ledger, order: &BorrowOrder) -> Self {
        let reader_name = ledger
            .users
            .get(&order.reader_id)
            .map(|u| u.name.clone())
            .unwrap_or_default();
        let items = order
            .items
            .iter()
            .map(|item| OrderItemView {
                id: item.id,
                book_id: item.book_id,
                title: ledger
                    .books
                    .get(&item.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
                quantity: item.quantity,
            })
            .collect();

        Self {
            id: order.id,
            reader_id: order.reader_id,
            reader_name,
            status: order.status,
            payment_status: order.payment_status,
            loan_days: order.loan_days,
            note: order.note.clone(),
            total_fee: order.total_fee,
            total_deposit: order.total_deposit,
            pickup_expires_at: order.pickup_expires_at,
            issued_at: order.issued_at,
            created_at: order.created_at,
            items,
        }
    }
}

/// An order with its payments and borrowings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    /// The order.
    #[serde(flatten)]
    pub order: OrderView,
    /// Payments against the order.
    pub payments: Vec<Payment>,
    /// Borrowings issued from the order, newest first.
    pub borrowings: Vec<Borrowing>,
}

/// Result of issuing an order.
#[derive(Debug, Clone, Serialize)]
pub struct IssueOutcome {
    /// The order after issue.
    pub order: OrderView,
    /// Borrowings created, in allocation order.
    pub borrowings: Vec<Borrowing>,
}

fn newest_first(a: &BorrowOrder, b: &BorrowOrder) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn order_view(ledger: &Ledger, order_id: u64) -> Result<OrderView> {
    let order = ledger
        .orders
        .get(&order_id)
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(OrderView::build(ledger, order))
}

/// Places an order for the caller.
///
/// # Arguments
///
/// * `library` - Library to modify
/// * `form` - Cart lines, loan length and note
///
/// # Returns
///
/// The new PENDING, UNPAID order.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for an empty cart or a book without
/// enough AVAILABLE copies, and a not-found error for an unknown book.
pub fn create_order(library: &Library, form: NewOrder) -> Result<OrderView> {
    if form.items.is_empty() {
        return Err(AppError::InvalidInput("Cart is empty".to_string()));
    }
    let config = library.config();
    let loan_days = clamp_or(form.loan_days, config.default_loan_days, 1, config.max_loan_days);
    let lines: Vec<(u64, u32)> = form
        .items
        .iter()
        .map(|line| (line.book_id, clamp_or(line.quantity, 1, 1, config.max_item_quantity)))
        .collect();
    let note = form
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    library.transaction_as(Role::Reader, |ledger, actor, now| {
        for &(book_id, quantity) in &lines {
            ledger.book(book_id)?;
            let available = ledger.available_copy_count(book_id);
            if available < quantity {
                return Err(AppError::InvalidInput(format!(
                    "Not enough available copies for bookId={book_id}. Available={available}"
                )));
            }
        }

        let id = ledger.next_order_id();
        let first_item = ledger.next_order_item_id();
        let items = lines
            .iter()
            .zip(first_item..)
            .map(|(&(book_id, quantity), item_id)| BorrowOrderItem {
                id: item_id,
                book_id,
                quantity,
            })
            .collect();
        let order = BorrowOrder {
            id,
            reader_id: actor.user_id,
            status: OrderStatus::Pending,
            payment_status: PaymentState::Unpaid,
            loan_days,
            note,
            total_fee: 0,
            total_deposit: 0,
            pickup_expires_at: None,
            issued_at: None,
            created_at: now,
            items,
        };
        order.validate()?;
        tracing::info!(
            order_id = id,
            reader_id = actor.user_id,
            copies = order.total_quantity(),
            "order placed"
        );
        ledger.orders.insert(id, order);
        order_view(ledger, id)
    })
}

/// The caller's orders, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a READER.
pub fn my_orders(library: &Library) -> Result<Vec<OrderView>> {
    library.read_as(Role::Reader, |ledger, actor, _| {
        let mut mine: Vec<&BorrowOrder> = ledger
            .orders
            .values()
            .filter(|o| o.reader_id == actor.user_id)
            .collect();
        mine.sort_by(|a, b| newest_first(a, b));
        Ok(mine
            .into_iter()
            .take(READER_ORDER_LIMIT)
            .map(|o| OrderView::build(ledger, o))
            .collect())
    })
}

/// One of the caller's orders with payments and borrowings.
///
/// # Errors
///
/// Returns a not-found error unless the order belongs to the caller.
pub fn my_order_detail(library: &Library, order_id: u64) -> Result<OrderDetail> {
    library.read_as(Role::Reader, |ledger, actor, _| {
        let order = ledger
            .orders
            .get(&order_id)
            .filter(|o| o.reader_id == actor.user_id)
            .ok_or_else(|| AppError::not_found("Order"))?;

        let payments = ledger
            .payments_for(PaymentTarget::Order(order_id))
            .cloned()
            .collect();
        let mut borrowings: Vec<Borrowing> = ledger
            .order_borrowings(order_id)
            .into_iter()
            .cloned()
            .collect();
        borrowings.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date).then(b.id.cmp(&a.id)));

        Ok(OrderDetail {
            order: OrderView::build(ledger, order),
            payments,
            borrowings,
        })
    })
}

/// The librarian order queue, newest first.
///
/// # Errors
///
/// Returns an auth error unless the caller is a LIBRARIAN.
pub fn list_orders(library: &Library, status: Option<OrderStatus>) -> Result<Vec<OrderView>> {
    library.read_as(Role::Librarian, |ledger, _, _| {
        let mut queue: Vec<&BorrowOrder> = ledger
            .orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        queue.sort_by(|a, b| newest_first(a, b));
        Ok(queue
            .into_iter()
            .take(DESK_ORDER_LIMIT)
            .map(|o| OrderView::build(ledger, o))
            .collect())
    })
}

/// Approves a PENDING order and starts its pickup window.
///
/// # Errors
///
/// Returns a not-found error for an unknown order and a transition error
/// unless it is PENDING.
pub fn approve_order(library: &Library, order_id: u64) -> Result<OrderView> {
    let pickup_days = library.config().pickup_days;
    library.transaction_as(Role::Librarian, |ledger, actor, now| {
        let pickup_expires_at = libris_core::fine::days_after(now, pickup_days)?;
        let order = ledger
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("Order"))?;
        order.status.can_transition_to(OrderStatus::Approved)?;
        order.status = OrderStatus::Approved;
        order.pickup_expires_at = Some(pickup_expires_at);
        tracing::info!(order_id, by = actor.user_id, "order approved");
        order_view(ledger, order_id)
    })
}

/// Cancels a PENDING or APPROVED order.
///
/// # Errors
///
/// Returns a not-found error for an unknown order and a transition error
/// from any other status.
pub fn cancel_order(library: &Library, order_id: u64) -> Result<OrderView> {
    library.transaction_as(Role::Librarian, |ledger, actor, _| {
        let order = ledger
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::not_found("Order"))?;
        order.status.can_transition_to(OrderStatus::Cancelled)?;
        order.status = OrderStatus::Cancelled;
        tracing::info!(order_id, by = actor.user_id, "order cancelled");
        order_view(ledger, order_id)
    })
}

fn issued(ledger: &Ledger, order_id: u64, borrowing_ids: &[u64]) -> Result<IssueOutcome> {
    let borrowings = borrowing_ids
        .iter()
        .filter_map(|id| ledger.borrowings.get(id).cloned())
        .collect();
    Ok(IssueOutcome {
        order: order_view(ledger, order_id)?,
        borrowings,
    })
}

/// Issues an APPROVED order with the lowest-numbered AVAILABLE copies.
///
/// # Errors
///
/// Returns an issuance error if the order is not APPROVED or a book runs
/// short of copies; nothing is issued in that case.
pub fn issue_order(library: &Library, order_id: u64) -> Result<IssueOutcome> {
    library.transaction_as(Role::Librarian, |ledger, actor, now| {
        let ids = ledger.issue_order(order_id, now)?;
        tracing::debug!(order_id, by = actor.user_id, "order issued from shelf");
        issued(ledger, order_id, &ids)
    })
}

/// Issues an APPROVED order with librarian-chosen copies.
///
/// # Arguments
///
/// * `allocations` - One `(order item, copy)` pair per copy handed out
///
/// # Errors
///
/// Returns an issuance error for any rejected allocation; nothing is issued
/// in that case.
pub fn issue_by_copies(
    library: &Library,
    order_id: u64,
    allocations: &[Allocation],
) -> Result<IssueOutcome> {
    library.transaction_as(Role::Librarian, |ledger, actor, now| {
        let ids = ledger.issue_by_copies(order_id, allocations, now)?;
        tracing::debug!(order_id, by = actor.user_id, "order issued by copies");
        issued(ledger, order_id, &ids)
    })
}
