// Rust guideline compliant 2026-10-16

mod common;

use chrono::Duration;
use common::{jan, Fixture, ALICE, BOB};
use libris_app::orders::{self, CartLine, NewOrder};
use libris_app::payments::{self, PayOutcome};
use libris_app::{circulation, ErrorCode, FineFilter};
use libris_core::{Allocation, CopyStatus, IssueError, OrderStatus, PaymentState};

fn cart(lines: &[(u64, u32)]) -> NewOrder {
    NewOrder {
        items: lines
            .iter()
            .map(|&(book_id, quantity)| CartLine {
                book_id,
                quantity: Some(quantity),
            })
            .collect(),
        loan_days: None,
        note: Some("  weekend reading ".to_string()),
    }
}

fn issue_error(err: libris_app::AppError) -> IssueError {
    match err {
        libris_app::AppError::Core(libris_core::Error::Issue(issue)) => issue,
        other => panic!("expected an issuance error, got {other:?}"),
    }
}

#[test]
fn test_create_order_validation() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 2);
    let alice = fixture.act_as("alice");

    let err = orders::create_order(alice, NewOrder::default()).unwrap_err();
    assert_eq!(err.to_string(), "Cart is empty");

    let err = orders::create_order(alice, cart(&[(book, 3)])).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Not enough available copies for bookId={book}. Available=2")
    );
    assert_eq!(orders::create_order(alice, cart(&[(77, 1)])).unwrap_err().http_status(), 404);

    let order = orders::create_order(alice, cart(&[(book, 2)])).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentState::Unpaid);
    assert_eq!(order.loan_days, 14);
    assert_eq!(order.note.as_deref(), Some("weekend reading"));
    assert_eq!(order.items[0].title, "Dune");
}

#[test]
fn test_quantity_and_loan_days_are_clamped() {
    let mut fixture = Fixture::new();
    let book = fixture.add_book("Dune", 6);
    let alice = fixture.act_as("alice");
    let form = NewOrder {
        items: vec![CartLine {
            book_id: book,
            quantity: Some(50),
        }],
        loan_days: Some(365),
        note: None,
    };
    let order = orders::create_order(alice, form).unwrap();
    assert_eq!(order.items[0].quantity, 5);
    assert_eq!(order.loan_days, 60);
}

#[test]
fn test_order_lifecycle_to_completed() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 2);
    let emma = fixture.add_book("Emma", 1);
    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 2), (emma, 1)])).unwrap();

    let librarian = fixture.act_as("librarian");
    let err = orders::issue_order(librarian, order.id).unwrap_err();
    assert!(matches!(issue_error(err), IssueError::OrderNotApproved));

    let approved = orders::approve_order(librarian, order.id).unwrap();
    assert_eq!(approved.status, OrderStatus::Approved);
    assert_eq!(approved.pickup_expires_at, Some(jan(12)));
    assert_eq!(
        orders::approve_order(librarian, order.id).unwrap_err().code(),
        ErrorCode::InvalidTransition
    );

    let issued = orders::issue_order(librarian, order.id).unwrap();
    assert_eq!(issued.order.status, OrderStatus::Borrowed);
    assert_eq!(issued.order.issued_at, Some(jan(10)));
    assert_eq!(issued.borrowings.len(), 3);
    assert!(issued
        .borrowings
        .iter()
        .all(|b| b.order_id == Some(order.id) && b.due_date == jan(24)));

    let copies: Vec<u64> = issued.borrowings.iter().map(|b| b.copy_id).collect();
    for (n, copy) in copies.iter().enumerate() {
        let outcome = circulation::return_copy(librarian, *copy).unwrap();
        let expected = (n == copies.len() - 1).then_some(order.id);
        assert_eq!(outcome.completed_order, expected);
    }

    let listed = orders::list_orders(librarian, Some(OrderStatus::Completed)).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(orders::list_orders(librarian, Some(OrderStatus::Pending))
        .unwrap()
        .is_empty());
}

#[test]
fn test_issue_by_copies_rejects_quantity_mismatch() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 2);
    let emma = fixture.add_book("Emma", 1);
    let ledger = fixture.ledger();
    let dune_copies: Vec<u64> = ledger.copies_of(dune).map(|c| c.id).collect();

    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 2), (emma, 1)])).unwrap();
    let librarian = fixture.act_as("librarian");
    orders::approve_order(librarian, order.id).unwrap();

    let allocations = [
        Allocation {
            order_item_id: order.items[0].id,
            copy_id: dune_copies[0],
        },
        Allocation {
            order_item_id: order.items[0].id,
            copy_id: dune_copies[1],
        },
    ];
    let err = orders::issue_by_copies(librarian, order.id, &allocations).unwrap_err();
    assert_eq!(err.http_status(), 400);
    assert!(matches!(
        issue_error(err),
        IssueError::QuantityMismatch { expected: 1, actual: 0, .. }
    ));

    let ledger = fixture.ledger();
    assert_eq!(ledger.orders[&order.id].status, OrderStatus::Approved);
    assert!(ledger.borrowings.is_empty());
    assert!(ledger.copies().all(|c| c.status == CopyStatus::Available));
}

#[test]
fn test_issue_by_copies_with_reserved_copy() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 1);

    let alice = fixture.act_as("alice");
    let hold = alice_hold(alice, dune);
    let order = orders::create_order(alice, cart(&[(dune, 1)]));
    // The only copy is held, so the cart check fails.
    assert_eq!(order.unwrap_err().code(), ErrorCode::InvalidInput);

    fixture.add_copies(dune, 1);
    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 1)])).unwrap();
    let librarian = fixture.act_as("librarian");
    orders::approve_order(librarian, order.id).unwrap();

    let allocation = [Allocation {
        order_item_id: order.items[0].id,
        copy_id: hold,
    }];
    let issued = orders::issue_by_copies(librarian, order.id, &allocation).unwrap();
    assert_eq!(issued.borrowings[0].copy_id, hold);
    assert_eq!(issued.order.status, OrderStatus::Borrowed);
}

fn alice_hold(library: &libris_app::Library, book: u64) -> u64 {
    libris_app::reservations::reserve(library, book, None)
        .unwrap()
        .copy_id
}

#[test]
fn test_reader_sees_only_own_orders() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 1)])).unwrap();

    let detail = orders::my_order_detail(alice, order.id).unwrap();
    assert_eq!(detail.order.reader_id, ALICE);
    assert!(detail.payments.is_empty());
    assert_eq!(orders::my_orders(alice).unwrap().len(), 1);

    let bob = fixture.act_as("bob");
    assert!(orders::my_orders(bob).unwrap().is_empty());
    assert_eq!(orders::my_order_detail(bob, order.id).unwrap_err().http_status(), 404);
    assert_eq!(payments::pay_order(bob, order.id, None).unwrap_err().http_status(), 404);
}

#[test]
fn test_cancel_order() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 1)])).unwrap();

    let librarian = fixture.act_as("librarian");
    orders::approve_order(librarian, order.id).unwrap();
    let cancelled = orders::cancel_order(librarian, order.id).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(
        orders::cancel_order(librarian, order.id).unwrap_err().code(),
        ErrorCode::InvalidTransition
    );
}

#[test]
fn test_pay_order_once() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 1);
    let alice = fixture.act_as("alice");
    let order = orders::create_order(alice, cart(&[(dune, 1)])).unwrap();

    match payments::pay_order(alice, order.id, Some("card")).unwrap() {
        PayOutcome::Paid { payment } => {
            assert_eq!(payment.amount, 0);
            assert_eq!(payment.method, "CARD");
        }
        PayOutcome::AlreadyPaid => panic!("first payment should be recorded"),
    }
    assert!(matches!(
        payments::pay_order(alice, order.id, None).unwrap(),
        PayOutcome::AlreadyPaid
    ));

    let detail = orders::my_order_detail(alice, order.id).unwrap();
    assert_eq!(detail.order.payment_status, PaymentState::Paid);
    assert_eq!(detail.payments.len(), 1);
}

#[test]
fn test_fine_settlement() {
    let mut fixture = Fixture::new();
    let dune = fixture.add_book("Dune", 2);
    let copies: Vec<u64> = fixture.ledger().copies_of(dune).map(|c| c.id).collect();

    let librarian = fixture.act_as("librarian");
    circulation::borrow(librarian, ALICE, copies[0], Some(1)).unwrap();
    circulation::borrow(librarian, BOB, copies[1], Some(1)).unwrap();
    fixture.clock.advance(Duration::days(4));
    let librarian = fixture.act_as("librarian");
    let alice_fine = circulation::return_copy(librarian, copies[0]).unwrap().fine.unwrap();
    let bob_fine = circulation::return_copy(librarian, copies[1]).unwrap().fine.unwrap();
    assert_eq!(alice_fine.amount, 30_000);

    let alice = fixture.act_as("alice");
    let mine = payments::my_fines(alice).unwrap();
    assert_eq!(mine.len(), 1);
    assert!(!mine[0].paid);
    assert_eq!(payments::pay_my_fine(alice, bob_fine.id).unwrap_err().http_status(), 404);
    assert!(matches!(
        payments::pay_my_fine(alice, alice_fine.id).unwrap(),
        PayOutcome::Paid { .. }
    ));

    let accountant = fixture.act_as("accountant");
    assert!(matches!(
        payments::collect_fine(accountant, alice_fine.id, None).unwrap(),
        PayOutcome::AlreadyPaid
    ));
    let unpaid = payments::list_fines(accountant, FineFilter::Unpaid).unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].reader_name, "Bob");
    assert_eq!(unpaid[0].book_title, "Dune");

    match payments::collect_fine(accountant, bob_fine.id, None).unwrap() {
        PayOutcome::Paid { payment } => assert_eq!(payment.method, "CASH"),
        PayOutcome::AlreadyPaid => panic!("bob's fine was unpaid"),
    }
    assert_eq!(payments::list_fines(accountant, FineFilter::Paid).unwrap().len(), 2);

    let ledger_payments = payments::list_payments(accountant).unwrap();
    assert_eq!(ledger_payments.len(), 2);
    assert_eq!(ledger_payments[0].reader_name, "Bob");
    assert_eq!(ledger_payments[1].payment.method, "MOCK");
}
