// Rust guideline compliant 2026-10-15

mod common;

use chrono::Duration;
use common::{jan, Fixture, ACCOUNTANT, ALICE, BOB};
use libris_app::{circulation, reservations, ErrorCode};
use libris_core::{BorrowingStatus, CopyStatus, ReservationStatus};

fn first_copy(fixture: &Fixture, book: u64) -> u64 {
    fixture.ledger().copies_of(book).next().unwrap().id
}

#[test]
fn test_borrow_defaults_and_on_time_return() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let copy = first_copy(&fixture, book);
    let librarian = fixture.act_as("librarian");

    let loan = circulation::borrow(librarian, ALICE, copy, Some(0)).unwrap();
    assert_eq!(loan.due_date, jan(10) + Duration::days(14));
    assert_eq!(fixture.ledger().copy(copy).unwrap().status, CopyStatus::Borrowed);

    fixture.clock.set(jan(20));
    let librarian = fixture.act_as("librarian");
    let outcome = circulation::return_copy(librarian, copy).unwrap();
    assert_eq!(outcome.borrowing.status, BorrowingStatus::Returned);
    assert_eq!(outcome.borrowing.return_date, Some(jan(20)));
    assert!(outcome.fine.is_none());
    assert_eq!(fixture.ledger().copy(copy).unwrap().status, CopyStatus::Available);
}

#[test]
fn test_borrow_rejects_oversized_loan_length() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let copy = first_copy(&fixture, book);
    let max = fixture.library.config().max_loan_days;
    let librarian = fixture.act_as("librarian");

    for days in [max + 1, u32::MAX] {
        let err = circulation::borrow(librarian, ALICE, copy, Some(days)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.to_string(), format!("Loan length must be at most {max} days"));
    }
    assert_eq!(fixture.ledger().copy(copy).unwrap().status, CopyStatus::Available);

    let librarian = fixture.act_as("librarian");
    let loan = circulation::borrow(librarian, ALICE, copy, Some(max)).unwrap();
    assert_eq!(loan.due_date, jan(10) + Duration::days(i64::from(max)));
}

#[test]
fn test_three_days_late_is_fined_once() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let copy = first_copy(&fixture, book);

    // Borrowed on the 3rd for 7 days: due 2024-01-10, returned 2024-01-13.
    fixture.clock.set(jan(3));
    let librarian = fixture.act_as("librarian");
    let loan = circulation::borrow(librarian, ALICE, copy, Some(7)).unwrap();
    assert_eq!(loan.due_date, jan(10));

    fixture.clock.set(jan(13));
    let librarian = fixture.act_as("librarian");
    let outcome = circulation::return_copy(librarian, copy).unwrap();
    let fine = outcome.fine.unwrap();
    assert_eq!(fine.amount, 30_000);
    assert_eq!(fine.borrowing_id, loan.id);

    let err = circulation::return_copy(librarian, copy).unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert_eq!(fixture.ledger().fines.len(), 1);
}

#[test]
fn test_borrow_rejects_unknown_reader_and_copy() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let copy = first_copy(&fixture, book);
    let librarian = fixture.act_as("librarian");

    let err = circulation::borrow(librarian, ACCOUNTANT, copy, None).unwrap_err();
    assert_eq!(err.to_string(), "Reader not found");
    let err = circulation::borrow(librarian, ALICE, 999, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    circulation::borrow(librarian, ALICE, copy, None).unwrap();
    let err = circulation::borrow(librarian, BOB, copy, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[test]
fn test_reserved_copy_only_goes_to_holder() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    let hold = reservations::reserve(alice, book, None).unwrap();
    assert_eq!(hold.expires_at, jan(12));

    let librarian = fixture.act_as("librarian");
    let err = circulation::borrow(librarian, BOB, hold.copy_id, None).unwrap_err();
    assert_eq!(err.http_status(), 400);

    let candidates = circulation::issue_candidates(librarian, book, Some(ALICE)).unwrap();
    assert_eq!(candidates.len(), 1);
    assert!(circulation::issue_candidates(librarian, book, None).unwrap().is_empty());

    circulation::borrow(librarian, ALICE, hold.copy_id, None).unwrap();
    let ledger = fixture.ledger();
    assert_eq!(ledger.reservations[&hold.id].status, ReservationStatus::Fulfilled);
    assert_eq!(ledger.copy(hold.copy_id).unwrap().status, CopyStatus::Borrowed);
}

#[test]
fn test_reservation_sweep_releases_copy() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 2);
    let alice = fixture.act_as("alice");
    let hold = reservations::reserve(alice, book, Some(2)).unwrap();
    assert_eq!(hold.copy_id, first_copy(&fixture, book));

    fixture.clock.set(jan(12) + Duration::minutes(1));
    let alice = fixture.act_as("alice");
    let mine = reservations::my_reservations(alice).unwrap();
    assert_eq!(mine[0].status, ReservationStatus::Expired);

    let ledger = fixture.ledger();
    assert_eq!(ledger.copy(hold.copy_id).unwrap().status, CopyStatus::Available);
    assert!(fixture.library.sweep().unwrap().is_empty());
}

#[test]
fn test_explicit_sweep() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let bob = fixture.act_as("bob");
    let hold = reservations::reserve(bob, book, Some(1)).unwrap();

    fixture.clock.advance(Duration::days(2));
    assert_eq!(fixture.library.sweep().unwrap(), vec![hold.id]);
    assert!(fixture.library.sweep().unwrap().is_empty());
}

#[test]
fn test_sweep_on_demand_requires_admin() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let bob = fixture.act_as("bob");
    let hold = reservations::reserve(bob, book, Some(1)).unwrap();
    fixture.clock.advance(Duration::days(2));

    let err = fixture.library.sweep_as(libris_core::Role::Admin).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(
        fixture.ledger().reservations[&hold.id].status,
        ReservationStatus::Active
    );

    let admin = fixture.act_as("admin");
    assert_eq!(admin.sweep_as(libris_core::Role::Admin).unwrap(), vec![hold.id]);
}

#[test]
fn test_reserve_without_available_copy() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    reservations::reserve(alice, book, None).unwrap();
    let err = reservations::reserve(alice, book, None).unwrap_err();
    assert_eq!(err.to_string(), "No available copy to reserve");
    assert_eq!(reservations::reserve(alice, 42, None).unwrap_err().http_status(), 404);
}

#[test]
fn test_reserve_rejects_oversized_hold_length() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let max = fixture.library.config().max_hold_days;
    let alice = fixture.act_as("alice");

    for days in [max + 1, u32::MAX] {
        let err = reservations::reserve(alice, book, Some(days)).unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.to_string(), format!("Hold length must be at most {max} days"));
    }
    assert!(fixture.ledger().reservations.is_empty());

    let alice = fixture.act_as("alice");
    let hold = reservations::reserve(alice, book, Some(max)).unwrap();
    assert_eq!(hold.expires_at, jan(10) + Duration::days(i64::from(max)));
}

#[test]
fn test_cancel_reservation() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    let hold = reservations::reserve(alice, book, None).unwrap();

    let bob = fixture.act_as("bob");
    let err = reservations::cancel_reservation(bob, hold.id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    let alice = fixture.act_as("alice");
    assert!(reservations::cancel_reservation(alice, hold.id).unwrap());
    assert!(!reservations::cancel_reservation(alice, hold.id).unwrap());
    let ledger = fixture.ledger();
    assert_eq!(ledger.reservations[&hold.id].status, ReservationStatus::Cancelled);
    assert_eq!(ledger.copy(hold.copy_id).unwrap().status, CopyStatus::Available);
}

#[test]
fn test_desk_listing_and_reader_history() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 2);
    fixture.add_book("Emma", 1);
    let lent = first_copy(&fixture, dune);
    let librarian = fixture.act_as("librarian");
    circulation::borrow(librarian, ALICE, lent, Some(3)).unwrap();

    let rows = circulation::available_copies(librarian, Some("DUNE")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].reader_id, Some(ALICE));
    assert_eq!(rows[1].reader_id, None);
    assert_eq!(circulation::available_copies(librarian, None).unwrap().len(), 3);
    assert_eq!(circulation::search_books(librarian, Some("emma")).unwrap().len(), 1);

    fixture.clock.advance(Duration::days(5));
    let alice = fixture.act_as("alice");
    let loans = circulation::reader_borrows(alice, true).unwrap();
    assert_eq!(loans.len(), 1);
    assert!(loans[0].overdue);
    assert_eq!(loans[0].title, "Dune");

    let bob = fixture.act_as("bob");
    assert!(circulation::reader_borrows(bob, false).unwrap().is_empty());
}
