// Rust guideline compliant 2026-10-14

//! Listing, filtering and parsing helpers shared by the services.

use crate::error::{AppError, Result};
use libris_core::{CopyEvent, OrderStatus, Role};
use rayon::prelude::*;
use serde::Serialize;

/// Row count above which filtering runs on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 1_000;

/// Keeps the rows matching `predicate`, in order.
///
/// Large inputs are filtered in parallel; the result order is the same
/// either way.
pub fn filter_rows<T, P>(rows: Vec<T>, predicate: P) -> Vec<T>
where
    T: Send,
    P: Fn(&T) -> bool + Sync + Send,
{
    if rows.len() >= PARALLEL_THRESHOLD {
        rows.into_par_iter().filter(|row| predicate(row)).collect()
    } else {
        rows.into_iter().filter(|row| predicate(row)).collect()
    }
}

/// Case-insensitive substring match against any of `fields`.
///
/// An empty needle matches everything.
#[must_use]
pub fn matches_search(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Clamps `value` into `min..=max`, using `default` when absent or zero.
#[must_use]
pub fn clamp_or(value: Option<u32>, default: u32, min: u32, max: u32) -> u32 {
    match value {
        Some(v) if v > 0 => v.clamp(min, max),
        _ => default.clamp(min, max),
    }
}

/// Parses an order status filter.
///
/// # Errors
///
/// Returns an error if the status is invalid.
pub fn parse_order_status(value: &str) -> Result<OrderStatus> {
    match value.to_uppercase().as_str() {
        "PENDING" => Ok(OrderStatus::Pending),
        "APPROVED" => Ok(OrderStatus::Approved),
        "BORROWED" => Ok(OrderStatus::Borrowed),
        "CANCELLED" | "CANCELED" => Ok(OrderStatus::Cancelled),
        "COMPLETED" => Ok(OrderStatus::Completed),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid order status: {value}"
        ))),
    }
}

/// Parses an account role.
///
/// # Errors
///
/// Returns an error if the role is invalid.
pub fn parse_role(value: &str) -> Result<Role> {
    match value.to_uppercase().as_str() {
        "ADMIN" => Ok(Role::Admin),
        "LIBRARIAN" => Ok(Role::Librarian),
        "ACCOUNTANT" => Ok(Role::Accountant),
        "READER" => Ok(Role::Reader),
        _ => Err(AppError::InvalidInput(format!("Invalid role: {value}"))),
    }
}

/// Parses a librarian copy action: `lost`, `damaged` or `restore`.
///
/// # Errors
///
/// Returns an error for any other action.
pub fn parse_copy_action(value: &str) -> Result<CopyEvent> {
    match value.to_lowercase().as_str() {
        "lost" => Ok(CopyEvent::MarkLost),
        "damaged" => Ok(CopyEvent::MarkDamaged),
        "restore" | "available" => Ok(CopyEvent::Restore),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid copy action: {value} (expected lost, damaged or restore)"
        ))),
    }
}

/// Payment-state filter for fine listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FineFilter {
    /// Every fine.
    #[default]
    All,
    /// Fines with a PAID payment.
    Paid,
    /// Fines without one.
    Unpaid,
}

/// Parses a fine filter.
///
/// # Errors
///
/// Returns an error if the filter is invalid.
pub fn parse_fine_filter(value: &str) -> Result<FineFilter> {
    match value.to_lowercase().as_str() {
        "all" | "" => Ok(FineFilter::All),
        "paid" => Ok(FineFilter::Paid),
        "unpaid" => Ok(FineFilter::Unpaid),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid fine filter: {value} (expected paid, unpaid or all)"
        ))),
    }
}
