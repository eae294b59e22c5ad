// Rust guideline compliant 2026-10-13

//! Shared fixtures for ledger-level tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use libris_core::{Book, BorrowOrder, BorrowOrderItem, Ledger, OrderStatus, PaymentState, Role, User};

/// Reader used by most tests.
pub const ALICE: u64 = 1;
/// A second reader.
pub const BOB: u64 = 2;

/// 09:00 UTC on the given day of January 2024.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()
}

pub fn user(id: u64, name: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "salt$hash".to_string(),
        role,
        phone: None,
        address: None,
        gender: None,
        birth_date: None,
        created_at: jan(1),
        updated_at: jan(1),
    }
}

pub fn book(id: u64, title: &str) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: "Author".to_string(),
        genre: "Fiction".to_string(),
        language: "English".to_string(),
        published_year: Some(2001),
        description: String::new(),
        location: "Shelf-A".to_string(),
        created_at: jan(1),
        updated_at: jan(1),
    }
}

/// Two readers, and `copies` available copies of each listed book.
///
/// Copy ids are assigned in order: book 1 gets `1..=copies`, book 2 the next
/// block, and so on.
pub fn library(books: u64, copies: usize) -> Ledger {
    let mut ledger = Ledger::new();
    ledger.users.insert(ALICE, user(ALICE, "Alice", Role::Reader));
    ledger.users.insert(BOB, user(BOB, "Bob", Role::Reader));
    for book_id in 1..=books {
        ledger.books.insert(book_id, book(book_id, &format!("Book {book_id}")));
        for _ in 0..copies {
            ledger.insert_copy(book_id, jan(1)).unwrap();
        }
    }
    ledger
}

/// Adds an order for `reader` with `(book_id, quantity)` items and returns its id.
pub fn add_order(
    ledger: &mut Ledger,
    reader: u64,
    items: &[(u64, u32)],
    status: OrderStatus,
) -> u64 {
    let id = ledger.next_order_id();
    let mut next_item = ledger.next_order_item_id();
    let items = items
        .iter()
        .map(|(book_id, quantity)| {
            let item = BorrowOrderItem {
                id: next_item,
                book_id: *book_id,
                quantity: *quantity,
            };
            next_item += 1;
            item
        })
        .collect();
    ledger.orders.insert(
        id,
        BorrowOrder {
            id,
            reader_id: reader,
            status,
            payment_status: PaymentState::Unpaid,
            loan_days: 14,
            note: None,
            total_fee: 0,
            total_deposit: 0,
            pickup_expires_at: None,
            issued_at: None,
            created_at: jan(2),
            items,
        },
    );
    id
}
