// Rust guideline compliant 2026-10-09

//! Finite State Machine module for lifecycle transitions.
//!
//! Copy status follows this table; every other pair is rejected:
//!
//! - Available → Reserved (reserve)
//! - Reserved → Available (release hold)
//! - Available | Reserved → Borrowed (issue)
//! - Borrowed → Available (return)
//! - Available → Lost | Damaged
//! - Lost | Damaged → Available (restore)
//!
//! Reservations, borrowings and orders have their own, smaller tables below.

use crate::models::{BorrowingStatus, CopyStatus, OrderStatus, ReservationStatus};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events that move a copy between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyEvent {
    /// A reader places a hold.
    Reserve,
    /// A hold is cancelled or expires.
    ReleaseHold,
    /// The copy is lent out.
    Issue,
    /// The copy comes back.
    Return,
    /// The copy is reported lost.
    MarkLost,
    /// The copy is withdrawn for damage.
    MarkDamaged,
    /// A lost or damaged copy goes back on the shelf.
    Restore,
}

impl CopyEvent {
    /// All events, in declaration order.
    pub const ALL: [CopyEvent; 7] = [
        CopyEvent::Reserve,
        CopyEvent::ReleaseHold,
        CopyEvent::Issue,
        CopyEvent::Return,
        CopyEvent::MarkLost,
        CopyEvent::MarkDamaged,
        CopyEvent::Restore,
    ];
}

impl fmt::Display for CopyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CopyEvent::Reserve => "reserve",
            CopyEvent::ReleaseHold => "release_hold",
            CopyEvent::Issue => "issue",
            CopyEvent::Return => "return",
            CopyEvent::MarkLost => "mark_lost",
            CopyEvent::MarkDamaged => "mark_damaged",
            CopyEvent::Restore => "restore",
        };
        f.write_str(name)
    }
}

impl CopyStatus {
    /// Applies an event and returns the resulting status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the event is not legal in the
    /// current status, e.g. issuing a copy that is already borrowed.
    pub fn apply(self, event: CopyEvent) -> Result<CopyStatus> {
        use CopyEvent as E;
        use CopyStatus as S;

        let next = match (self, event) {
            (S::Available, E::Reserve) => S::Reserved,
            (S::Reserved, E::ReleaseHold) => S::Available,
            (S::Available | S::Reserved, E::Issue) => S::Borrowed,
            (S::Borrowed, E::Return) => S::Available,
            (S::Available, E::MarkLost) => S::Lost,
            (S::Available, E::MarkDamaged) => S::Damaged,
            (S::Lost | S::Damaged, E::Restore) => S::Available,
            _ => {
                return Err(Error::InvalidTransition(format!(
                    "Cannot {} a copy that is {}",
                    event, self
                )))
            }
        };
        Ok(next)
    }

    /// Returns the events that are legal in this status.
    #[must_use]
    pub fn valid_events(self) -> Vec<CopyEvent> {
        CopyEvent::ALL
            .into_iter()
            .filter(|event| self.apply(*event).is_ok())
            .collect()
    }

    /// Returns true if the copy can be handed out (available or reserved).
    #[must_use]
    pub fn is_issuable(self) -> bool {
        self.apply(CopyEvent::Issue).is_ok()
    }
}

impl ReservationStatus {
    /// Checks if a transition to the target status is valid.
    ///
    /// Only ACTIVE reservations move; every other status is terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation is not ACTIVE or the target is ACTIVE.
    pub fn can_transition_to(&self, target: ReservationStatus) -> Result<()> {
        if *self == ReservationStatus::Active && target != ReservationStatus::Active {
            return Ok(());
        }
        Err(Error::InvalidTransition(format!(
            "Cannot move reservation from {} to {}",
            self, target
        )))
    }
}

impl BorrowingStatus {
    /// Checks if a transition to the target status is valid.
    ///
    /// # Errors
    ///
    /// Returns an error unless the transition is ACTIVE → RETURNED.
    pub fn can_transition_to(&self, target: BorrowingStatus) -> Result<()> {
        if *self == BorrowingStatus::Active && target == BorrowingStatus::Returned {
            return Ok(());
        }
        Err(Error::InvalidTransition(format!(
            "Cannot move borrowing from {} to {}",
            self, target
        )))
    }
}

impl OrderStatus {
    /// Checks if a transition to the target status is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not one of:
    /// - Pending → Approved
    /// - Approved → Borrowed
    /// - Pending | Approved → Cancelled
    /// - Borrowed → Completed
    pub fn can_transition_to(&self, target: OrderStatus) -> Result<()> {
        use OrderStatus as S;

        let allowed = matches!(
            (self, target),
            (S::Pending, S::Approved)
                | (S::Approved, S::Borrowed)
                | (S::Pending | S::Approved, S::Cancelled)
                | (S::Borrowed, S::Completed)
        );

        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!(
                "Order is {}, cannot move to {}",
                self, target
            )))
        }
    }
}
