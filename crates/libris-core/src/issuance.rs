// Rust guideline compliant 2026-10-11

//! Order issuance: turning an approved order into borrowings.
//!
//! Validation runs to completion before the ledger is touched, so a rejected
//! allocation leaves every table as it was.

use crate::error::IssueError;
use crate::ledger::Ledger;
use crate::models::{BookCopy, CopyStatus, OrderStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Upper bound on the candidates returned by [`Ledger::issue_candidates`].
pub const CANDIDATE_LIMIT: usize = 200;

/// A copy assigned to one item of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Order item the copy fulfills.
    pub order_item_id: u64,
    /// Copy handed out.
    pub copy_id: u64,
}

impl Ledger {
    /// Issues an approved order using librarian-chosen copies.
    ///
    /// # Arguments
    ///
    /// * `order_id` - Order to issue
    /// * `allocations` - One entry per copy handed out
    /// * `now` - Issue time; due dates are `now + order.loan_days`
    ///
    /// # Returns
    ///
    /// Ids of the created borrowings, in allocation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown order and
    /// [`Error::Issue`] for any rejected allocation.
    pub fn issue_by_copies(
        &mut self,
        order_id: u64,
        allocations: &[Allocation],
        now: DateTime<Utc>,
    ) -> Result<Vec<u64>> {
        self.validate_allocations(order_id, allocations, now)?;

        let (reader_id, loan_days) = {
            let order = self
                .orders
                .get(&order_id)
                .ok_or_else(|| Error::not_found("Order", order_id))?;
            (order.reader_id, order.loan_days)
        };
        let due = crate::fine::days_after(now, loan_days)?;

        let mut borrowing_ids = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            let id = self.issue_copy(reader_id, allocation.copy_id, Some(order_id), due, now)?;
            borrowing_ids.push(id);
        }

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| Error::not_found("Order", order_id))?;
        order.status.can_transition_to(OrderStatus::Borrowed)?;
        order.status = OrderStatus::Borrowed;
        order.issued_at = Some(now);
        tracing::info!(order_id, reader_id, copies = borrowing_ids.len(), "order issued");

        Ok(borrowing_ids)
    }

    /// Issues an approved order, picking the lowest-id AVAILABLE copies of
    /// each requested book.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError::NotEnoughCopies`] if a book has too few
    /// available copies, plus every error of [`Ledger::issue_by_copies`].
    pub fn issue_order(&mut self, order_id: u64, now: DateTime<Utc>) -> Result<Vec<u64>> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or_else(|| Error::not_found("Order", order_id))?;
        if order.status != OrderStatus::Approved {
            return Err(IssueError::OrderNotApproved.into());
        }

        let mut taken = HashSet::new();
        let mut allocations = Vec::new();
        for item in &order.items {
            let free: Vec<u64> = self
                .copies_of(item.book_id)
                .filter(|c| c.status == CopyStatus::Available && !taken.contains(&c.id))
                .map(|c| c.id)
                .collect();

            let wanted = item.quantity as usize;
            if free.len() < wanted {
                return Err(IssueError::NotEnoughCopies {
                    book_id: item.book_id,
                    requested: item.quantity,
                    available: u32::try_from(free.len()).unwrap_or(u32::MAX),
                }
                .into());
            }

            for copy_id in free.into_iter().take(wanted) {
                taken.insert(copy_id);
                allocations.push(Allocation {
                    order_item_id: item.id,
                    copy_id,
                });
            }
        }

        self.issue_by_copies(order_id, &allocations, now)
    }

    /// Copies a librarian may hand out for a book.
    ///
    /// AVAILABLE copies always qualify. When `reader_id` is given, RESERVED
    /// copies held by that reader's active reservation for the book qualify
    /// too.
    #[must_use]
    pub fn issue_candidates(
        &self,
        book_id: u64,
        reader_id: Option<u64>,
        now: DateTime<Utc>,
    ) -> Vec<&BookCopy> {
        self.copies_of(book_id)
            .filter(|copy| match (copy.status, reader_id) {
                (CopyStatus::Available, _) => true,
                (CopyStatus::Reserved, Some(reader)) => self
                    .active_reservation_for(copy.id, reader, book_id, now)
                    .is_some(),
                _ => false,
            })
            .take(CANDIDATE_LIMIT)
            .collect()
    }

    fn validate_allocations(
        &self,
        order_id: u64,
        allocations: &[Allocation],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or_else(|| Error::not_found("Order", order_id))?;
        if order.status != OrderStatus::Approved {
            return Err(IssueError::OrderNotApproved.into());
        }
        if allocations.is_empty() {
            return Err(IssueError::BadAllocation.into());
        }

        let mut per_item: BTreeMap<u64, u32> = BTreeMap::new();
        for allocation in allocations {
            if !order.items.iter().any(|i| i.id == allocation.order_item_id) {
                return Err(IssueError::UnknownItem(allocation.order_item_id).into());
            }
            *per_item.entry(allocation.order_item_id).or_default() += 1;
        }

        for item in &order.items {
            let actual = per_item.get(&item.id).copied().unwrap_or(0);
            if actual != item.quantity {
                return Err(IssueError::QuantityMismatch {
                    item_id: item.id,
                    expected: item.quantity,
                    actual,
                }
                .into());
            }
        }

        let mut seen = HashSet::new();
        for allocation in allocations {
            if !seen.insert(allocation.copy_id) {
                return Err(IssueError::DuplicateCopy(allocation.copy_id).into());
            }
        }

        for allocation in allocations {
            let book_id = order
                .items
                .iter()
                .find(|i| i.id == allocation.order_item_id)
                .map(|i| i.book_id)
                .ok_or(IssueError::UnknownItem(allocation.order_item_id))?;

            let copy = self
                .copy(allocation.copy_id)
                .map_err(|_| IssueError::CopyNotFound(allocation.copy_id))?;
            if copy.book_id != book_id {
                return Err(IssueError::CopyBookMismatch {
                    copy_id: copy.id,
                    book_id,
                }
                .into());
            }
            if !copy.status.is_issuable() {
                return Err(IssueError::CopyNotIssuable {
                    copy_id: copy.id,
                    status: copy.status,
                }
                .into());
            }
            if copy.status == CopyStatus::Reserved
                && self
                    .active_reservation_for(copy.id, order.reader_id, book_id, now)
                    .is_none()
            {
                return Err(IssueError::ReservedNotOwned(copy.id).into());
            }
        }

        Ok(())
    }
}

