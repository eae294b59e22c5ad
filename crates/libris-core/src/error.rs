// Rust guideline compliant 2026-10-09

//! Error types for the Libris core library.

use crate::models::CopyStatus;
use thiserror::Error;

/// Result type alias for Libris operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Libris operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid record data.
    #[error("Invalid record: {0}")]
    Invalid(String),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. "Book copy".
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Invalid state transition.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Order issuance rejected the allocation.
    #[error(transparent)]
    Issue(#[from] IssueError),

    /// The storage lock could not be acquired in time.
    #[error("Timed out waiting for the library lock after {0} ms")]
    LockTimeout(u64),

    /// Invalid configuration.
    #[error("Invalid config: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Reasons an order issuance can be rejected.
///
/// Variants are listed in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// The order is not in the APPROVED state.
    #[error("Order is not approved")]
    OrderNotApproved,

    /// The allocation payload is empty or malformed.
    #[error("Bad allocations payload")]
    BadAllocation,

    /// An allocation references an item outside this order.
    #[error("Order item {0} not found in this order")]
    UnknownItem(u64),

    /// Allocation count differs from the requested quantity.
    #[error("Allocations count must match each item quantity (item {item_id}: expected {expected}, got {actual})")]
    QuantityMismatch {
        /// Order item id.
        item_id: u64,
        /// Requested quantity.
        expected: u32,
        /// Allocated copies.
        actual: u32,
    },

    /// A copy id appears more than once in the allocation.
    #[error("Duplicate copyId {0} in allocations")]
    DuplicateCopy(u64),

    /// The copy does not exist.
    #[error("Copy {0} not found")]
    CopyNotFound(u64),

    /// The copy belongs to a different book.
    #[error("Copy {copy_id} does not belong to book {book_id}")]
    CopyBookMismatch {
        /// Copy id.
        copy_id: u64,
        /// Book the item requested.
        book_id: u64,
    },

    /// The copy is neither available nor reserved.
    #[error("Copy {copy_id} is not available/reserved for issue ({status})")]
    CopyNotIssuable {
        /// Copy id.
        copy_id: u64,
        /// Current copy status.
        status: CopyStatus,
    },

    /// The copy is reserved, but not by this reader.
    #[error("Reserved copy {0} does not belong to this reader")]
    ReservedNotOwned(u64),

    /// Automatic allocation found too few available copies.
    #[error("Not enough copies for book {book_id}: requested {requested}, available {available}")]
    NotEnoughCopies {
        /// Book id.
        book_id: u64,
        /// Requested quantity.
        requested: u32,
        /// Available copies.
        available: u32,
    },
}
