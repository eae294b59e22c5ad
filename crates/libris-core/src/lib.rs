// Rust guideline compliant 2026-10-12

//! Libris Core Library
//!
//! This crate provides the foundational components of the Libris lending engine:
//! - Data models (users, books, copies, reservations, borrowings, orders, fines, payments,
//!   reviews)
//! - Copy status FSM and the smaller lifecycles of the other entities
//! - The in-memory ledger with the reservation sweep and fine assessment
//! - Order issuance with copy allocation
//! - Storage engine (JSONL read/write, atomic replace, file locking)
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod fine;
pub mod fsm;
pub mod issuance;
pub mod ledger;
pub mod models;
pub mod storage;

pub use config::{Config, OutputFormat};
pub use error::{Error, IssueError, Result};
pub use fsm::CopyEvent;
pub use issuance::Allocation;
pub use ledger::{Ledger, RemovedCounts, Violation};
pub use models::{
    Book, BookCopy, BorrowOrder, BorrowOrderItem, Borrowing, BorrowingStatus, CopyStatus, Fine,
    OrderStatus, Payment, PaymentState, PaymentStatus, PaymentTarget, Record, Reservation,
    ReservationStatus, Review, Role, Session, User,
};
pub use storage::Storage;
