// Rust guideline compliant 2026-10-12

//! Unit tests for the FSM module.

use libris_core::{
    BorrowingStatus, CopyEvent, CopyStatus, Error, OrderStatus, ReservationStatus,
};

#[test]
fn test_issue_on_borrowed_copy_is_rejected() {
    let err = CopyStatus::Borrowed.apply(CopyEvent::Issue).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
    assert_eq!(
        err.to_string(),
        "Invalid state transition: Cannot issue a copy that is BORROWED"
    );
}

#[test]
fn test_reserved_copy_can_be_issued_or_released() {
    assert_eq!(
        CopyStatus::Reserved.apply(CopyEvent::Issue).unwrap(),
        CopyStatus::Borrowed
    );
    assert_eq!(
        CopyStatus::Reserved.apply(CopyEvent::ReleaseHold).unwrap(),
        CopyStatus::Available
    );
    assert!(CopyStatus::Reserved.apply(CopyEvent::MarkLost).is_err());
}

#[test]
fn test_lost_and_damaged_only_restore() {
    for status in [CopyStatus::Lost, CopyStatus::Damaged] {
        assert_eq!(status.valid_events(), vec![CopyEvent::Restore]);
        assert!(!status.is_issuable());
    }
}

#[test]
fn test_issuable_statuses() {
    assert!(CopyStatus::Available.is_issuable());
    assert!(CopyStatus::Reserved.is_issuable());
    assert!(!CopyStatus::Borrowed.is_issuable());
}

#[test]
fn test_reservation_closes_once() {
    assert!(ReservationStatus::Active
        .can_transition_to(ReservationStatus::Expired)
        .is_ok());
    assert!(ReservationStatus::Expired
        .can_transition_to(ReservationStatus::Expired)
        .is_err());
    assert!(ReservationStatus::Fulfilled
        .can_transition_to(ReservationStatus::Cancelled)
        .is_err());
}

#[test]
fn test_borrowing_only_returns() {
    assert!(BorrowingStatus::Active
        .can_transition_to(BorrowingStatus::Returned)
        .is_ok());
    assert!(BorrowingStatus::Returned
        .can_transition_to(BorrowingStatus::Active)
        .is_err());
}

#[test]
fn test_order_lifecycle() {
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Approved).is_ok());
    assert!(OrderStatus::Approved.can_transition_to(OrderStatus::Borrowed).is_ok());
    assert!(OrderStatus::Borrowed.can_transition_to(OrderStatus::Completed).is_ok());
    assert!(OrderStatus::Approved.can_transition_to(OrderStatus::Cancelled).is_ok());

    let err = OrderStatus::Pending
        .can_transition_to(OrderStatus::Borrowed)
        .unwrap_err();
    assert!(err.to_string().contains("Order is PENDING"));
    assert!(OrderStatus::Borrowed.can_transition_to(OrderStatus::Cancelled).is_err());
}
