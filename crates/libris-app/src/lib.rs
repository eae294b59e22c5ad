// Rust guideline compliant 2026-10-15

//! Application services for Libris.
//!
//! Every service opens one locked transaction on the library, resolves the
//! caller from the saved session, checks the role it requires and then
//! works on the ledger. Services return plain serializable views so the CLI
//! can render them as JSON, tables or text.

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod error;
pub mod library;
pub mod list;
pub mod orders;
pub mod payments;
pub mod readers;
pub mod repo;
pub mod reservations;
pub mod response;
pub mod time;
pub mod users;

pub use auth::{Actor, LoginOutcome, Registration};
pub use catalog::{
    BookDetail, BookPage, BookSort, BookSummary, BrowseQuery, NewBook, ReviewView,
};
pub use circulation::{BorrowView, DeskCopy, IssueCandidate, ReturnOutcome};
pub use error::{AppError, ErrorCode, Result};
pub use library::Library;
pub use list::FineFilter;
pub use orders::{CartLine, IssueOutcome, NewOrder, OrderDetail, OrderView};
pub use payments::{FineView, PayOutcome, PaymentView};
pub use readers::{ProfileUpdate, ReaderDetail, ReaderProfile};
pub use repo::RepoContext;
pub use reservations::ReservationView;
pub use response::{ErrorEnvelope, SuccessEnvelope};
pub use time::{Clock, FixedClock, SystemClock};
pub use users::{NewUser, UserUpdate, UserView};
