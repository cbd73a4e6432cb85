//! Append-only reward-point transactions.
//!
//! The transaction log is the source of truth for every balance; the
//! denormalized fields on the user record are a cache rebuildable from it.
//! Rows are never updated or deleted.

use crate::domain::foundation::{EventId, RegistrationId, Timestamp, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// Why points were credited or debited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardReason {
    /// Credit claimed for attending a completed event. At most one per
    /// (user, event); this uniqueness is the double-claim guard.
    EventAttendance,

    /// Debit spent as partial/full payment on a booking.
    BookingSpend,

    /// Manual correction from the admin dashboard.
    AdminAdjustment,
}

impl RewardReason {
    /// Stable string form used in storage and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardReason::EventAttendance => "event_attendance",
            RewardReason::BookingSpend => "booking_spend",
            RewardReason::AdminAdjustment => "admin_adjustment",
        }
    }
}

/// One immutable entry in a user's point ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPointTransaction {
    /// Unique identifier.
    pub id: TransactionId,

    /// User whose balance this entry affects.
    pub user_id: UserId,

    /// Signed point delta: positive = earn, negative = spend.
    pub delta: i64,

    /// Reason code.
    pub reason: RewardReason,

    /// Source event, for claim-sourced entries.
    pub event_id: Option<EventId>,

    /// Source registration, for claim-sourced entries.
    pub registration_id: Option<RegistrationId>,

    /// Free-form reference (booking ref for spends).
    pub reference: Option<String>,

    /// When the entry was appended.
    pub created_at: Timestamp,
}

impl RewardPointTransaction {
    /// Credit for attending a completed event.
    pub fn attendance_credit(
        user_id: UserId,
        event_id: EventId,
        registration_id: RegistrationId,
        points: i64,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            delta: points,
            reason: RewardReason::EventAttendance,
            event_id: Some(event_id),
            registration_id: Some(registration_id),
            reference: None,
            created_at: Timestamp::now(),
        }
    }

    /// Debit for spending points on a booking.
    pub fn booking_debit(user_id: UserId, points: i64, booking_ref: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            delta: -points,
            reason: RewardReason::BookingSpend,
            event_id: None,
            registration_id: None,
            reference: Some(booking_ref.into()),
            created_at: Timestamp::now(),
        }
    }

    /// Returns true for the idempotency-guarded claim entries.
    pub fn is_claim(&self) -> bool {
        self.reason == RewardReason::EventAttendance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_credit_is_positive_and_sourced() {
        let user = UserId::new();
        let event = EventId::new();
        let registration = RegistrationId::new();
        let tx = RewardPointTransaction::attendance_credit(user, event, registration, 50);

        assert_eq!(tx.delta, 50);
        assert_eq!(tx.reason, RewardReason::EventAttendance);
        assert_eq!(tx.event_id, Some(event));
        assert_eq!(tx.registration_id, Some(registration));
        assert!(tx.is_claim());
    }

    #[test]
    fn booking_debit_is_negative_with_reference() {
        let tx = RewardPointTransaction::booking_debit(UserId::new(), 30, "BK-2024-001");

        assert_eq!(tx.delta, -30);
        assert_eq!(tx.reason, RewardReason::BookingSpend);
        assert_eq!(tx.reference.as_deref(), Some("BK-2024-001"));
        assert!(tx.event_id.is_none());
        assert!(!tx.is_claim());
    }

    #[test]
    fn reason_strings_are_stable() {
        assert_eq!(RewardReason::EventAttendance.as_str(), "event_attendance");
        assert_eq!(RewardReason::BookingSpend.as_str(), "booking_spend");
        assert_eq!(RewardReason::AdminAdjustment.as_str(), "admin_adjustment");
    }

    #[test]
    fn reason_serializes_snake_case() {
        let json = serde_json::to_string(&RewardReason::BookingSpend).unwrap();
        assert_eq!(json, "\"booking_spend\"");
    }
}
