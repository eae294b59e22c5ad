// Rust guideline compliant 2026-10-09

//! Core data models for Libris.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `as_str` and `Display` for a unit-only status enum.
macro_rules! status_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the canonical upper-case name.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Role carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages the catalog and staff accounts.
    Admin,
    /// Runs the circulation desk.
    Librarian,
    /// Collects fines and reviews payments.
    Accountant,
    /// Borrows, reserves and orders books.
    Reader,
}

status_names!(Role {
    Admin => "ADMIN",
    Librarian => "LIBRARIAN",
    Accountant => "ACCOUNTANT",
    Reader => "READER",
});

/// Status of a physical book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    /// On the shelf.
    Available,
    /// Held for a reader by an active reservation.
    Reserved,
    /// Lent out under an active borrowing.
    Borrowed,
    /// Reported lost.
    Lost,
    /// Withdrawn for damage.
    Damaged,
}

status_names!(CopyStatus {
    Available => "AVAILABLE",
    Reserved => "RESERVED",
    Borrowed => "BORROWED",
    Lost => "LOST",
    Damaged => "DAMAGED",
});

/// Status of a reservation hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Hold is in force.
    Active,
    /// Cancelled by the reader.
    Cancelled,
    /// Lapsed past `expires_at`.
    Expired,
    /// The held copy was issued to the reader.
    Fulfilled,
}

status_names!(ReservationStatus {
    Active => "ACTIVE",
    Cancelled => "CANCELLED",
    Expired => "EXPIRED",
    Fulfilled => "FULFILLED",
});

/// Status of a borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowingStatus {
    /// Copy is out.
    Active,
    /// Copy came back.
    Returned,
}

status_names!(BorrowingStatus {
    Active => "ACTIVE",
    Returned => "RETURNED",
});

/// Status of a borrow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Waiting for a librarian.
    Pending,
    /// Approved, waiting for pickup.
    Approved,
    /// Copies were issued.
    Borrowed,
    /// Withdrawn before issue.
    Cancelled,
    /// Every issued copy was returned.
    Completed,
}

status_names!(OrderStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Borrowed => "BORROWED",
    Cancelled => "CANCELLED",
    Completed => "COMPLETED",
});

/// Whether an order has been paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// No payment recorded.
    #[default]
    Unpaid,
    /// Settled.
    Paid,
}

status_names!(PaymentState {
    Unpaid => "UNPAID",
    Paid => "PAID",
});

/// Status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded but not settled.
    Pending,
    /// Settled.
    Paid,
}

status_names!(PaymentStatus {
    Pending => "PENDING",
    Paid => "PAID",
});

/// A library account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id. Doubles as the reader id for readers.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Lower-case login email, unique.
    pub email: String,
    /// bcrypt password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional postal address (readers).
    #[serde(default)]
    pub address: Option<String>,
    /// Reader profile: gender, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Reader profile: date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Validates the account fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or email is empty, or the email has no `@`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::Invalid("User name cannot be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(crate::Error::Invalid(format!(
                "Invalid email: {}",
                self.email
            )));
        }
        Ok(())
    }
}

/// A login session issued by `auth login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Account the token authenticates.
    pub user_id: u64,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// A book title in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Book id.
    pub id: u64,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Genre or category.
    pub genre: String,
    /// Language of the edition.
    #[serde(default = "default_language")]
    pub language: String,
    /// Publication year.
    #[serde(default)]
    pub published_year: Option<i32>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Shelf location.
    #[serde(default = "default_location")]
    pub location: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Default language for new books.
pub fn default_language() -> String {
    "English".to_string()
}

/// Default shelf for new books.
pub fn default_location() -> String {
    "Shelf-A".to_string()
}

impl Book {
    /// Validates the book fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the title, author or genre is empty.
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("genre", &self.genre),
        ] {
            if value.trim().is_empty() {
                return Err(crate::Error::Invalid(format!(
                    "Book {field} cannot be empty"
                )));
            }
        }
        Ok(())
    }
}

/// One loanable copy of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    /// Copy id.
    pub id: u64,
    /// Owning book.
    pub book_id: u64,
    /// Current status. Written only through `Ledger::transition_copy`.
    pub status: CopyStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// A reader's time-boxed hold on a specific copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation id.
    pub id: u64,
    /// Reader holding the copy.
    pub reader_id: u64,
    /// Book reserved.
    pub book_id: u64,
    /// Copy held.
    pub copy_id: u64,
    /// Current status.
    pub status: ReservationStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Hold deadline.
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns true if the hold is ACTIVE and its deadline has passed.
    #[must_use]
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active && self.expires_at < now
    }
}

/// A copy lent to a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    /// Borrowing id.
    pub id: u64,
    /// Borrowing reader.
    pub reader_id: u64,
    /// Copy lent.
    pub copy_id: u64,
    /// Book of the copy.
    pub book_id: u64,
    /// Order this borrowing was issued from, if any.
    #[serde(default)]
    pub order_id: Option<u64>,
    /// Lending time.
    pub borrow_date: DateTime<Utc>,
    /// Due time.
    pub due_date: DateTime<Utc>,
    /// Return time, set exactly when `status` is RETURNED.
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    /// Current status.
    pub status: BorrowingStatus,
}

impl Borrowing {
    /// Validates the borrowing.
    ///
    /// # Errors
    ///
    /// Returns an error if `status` and `return_date` disagree, or the due
    /// date precedes the borrow date.
    pub fn validate(&self) -> crate::Result<()> {
        match (self.status, self.return_date) {
            (BorrowingStatus::Returned, None) => Err(crate::Error::Invalid(format!(
                "Borrowing {} is RETURNED without a return date",
                self.id
            ))),
            (BorrowingStatus::Active, Some(_)) => Err(crate::Error::Invalid(format!(
                "Borrowing {} is ACTIVE with a return date",
                self.id
            ))),
            _ if self.due_date < self.borrow_date => Err(crate::Error::Invalid(format!(
                "Borrowing {} is due before it was borrowed",
                self.id
            ))),
            _ => Ok(()),
        }
    }
}

/// Overdue penalty for one borrowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    /// Fine id.
    pub id: u64,
    /// Borrowing this fine penalizes. At most one fine per borrowing.
    pub borrowing_id: u64,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Assessment time.
    pub fine_date: DateTime<Utc>,
}

/// What a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// A fine.
    Fine(u64),
    /// A borrow order.
    Order(u64),
}

/// A settlement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: u64,
    /// Settled fine or order.
    pub target: PaymentTarget,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Upper-case payment method, e.g. `CASH`.
    pub method: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Settlement time.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Lowest star rating a review may give.
pub const MIN_RATING: u8 = 1;
/// Highest star rating a review may give.
pub const MAX_RATING: u8 = 5;

/// A reader's rating of a book. One per reader and book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review id.
    pub id: u64,
    /// Reviewing reader.
    pub reader_id: u64,
    /// Reviewed book.
    pub book_id: u64,
    /// Stars, 1 to 5.
    pub rating: u8,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Validates the rating.
    ///
    /// # Errors
    ///
    /// Returns an error if the rating is outside 1..=5.
    pub fn validate(&self) -> crate::Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(crate::Error::Invalid(format!(
                "Review {} has rating {}, expected {MIN_RATING}..={MAX_RATING}",
                self.id, self.rating
            )));
        }
        Ok(())
    }
}

/// One line of a borrow order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowOrderItem {
    /// Item id, unique across all orders.
    pub id: u64,
    /// Requested book.
    pub book_id: u64,
    /// Requested number of copies.
    pub quantity: u32,
}

/// A cart-style request for copies of several books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowOrder {
    /// Order id.
    pub id: u64,
    /// Requesting reader.
    pub reader_id: u64,
    /// Current status.
    pub status: OrderStatus,
    /// Payment state.
    #[serde(default)]
    pub payment_status: PaymentState,
    /// Loan length applied at issue.
    pub loan_days: u32,
    /// Reader note.
    #[serde(default)]
    pub note: Option<String>,
    /// Service fee.
    #[serde(default)]
    pub total_fee: i64,
    /// Refundable deposit.
    #[serde(default)]
    pub total_deposit: i64,
    /// Pickup deadline assigned at approval.
    #[serde(default)]
    pub pickup_expires_at: Option<DateTime<Utc>>,
    /// Issue time.
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Requested lines.
    pub items: Vec<BorrowOrderItem>,
}

impl BorrowOrder {
    /// Validates the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order has no items or an item has zero quantity.
    pub fn validate(&self) -> crate::Result<()> {
        if self.items.is_empty() {
            return Err(crate::Error::Invalid(format!(
                "Order {} has no items",
                self.id
            )));
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(crate::Error::Invalid(format!(
                "Order item {} has zero quantity",
                item.id
            )));
        }
        Ok(())
    }

    /// Total copies requested across all items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One line of the JSONL ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// Account.
    User(User),
    /// Login session.
    Session(Session),
    /// Catalog title.
    Book(Book),
    /// Physical copy.
    Copy(BookCopy),
    /// Reservation hold.
    Reservation(Reservation),
    /// Borrowing.
    Borrowing(Borrowing),
    /// Fine.
    Fine(Fine),
    /// Borrow order with its items.
    Order(BorrowOrder),
    /// Payment.
    Payment(Payment),
    /// Book review.
    Review(Review),
}

impl Record {
    /// Validates the wrapped entity.
    ///
    /// # Errors
    ///
    /// Returns the entity's validation error.
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            Record::User(user) => user.validate(),
            Record::Book(book) => book.validate(),
            Record::Borrowing(borrowing) => borrowing.validate(),
            Record::Order(order) => order.validate(),
            Record::Review(review) => review.validate(),
            Record::Session(_)
            | Record::Copy(_)
            | Record::Reservation(_)
            | Record::Fine(_)
            | Record::Payment(_) => Ok(()),
        }
    }
}
