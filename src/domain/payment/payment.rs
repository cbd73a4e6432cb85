//! Payment entity with a monotonic status machine.
//!
//! A Payment is correlated 1:1 with a checkout attempt. It is a separate
//! entity from the Registration so a failed attempt never corrupts
//! registration history. The webhook handler is the only writer of the
//! status field; the registration machine reacts to it.

use crate::domain::foundation::{
    DomainError, PaymentId, RegistrationId, StateMachine, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Payment lifecycle status. Monotonic: a payment never moves backward
/// from `refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Checkout session created, outcome unknown.
    Created,

    /// Gateway reported success.
    Paid,

    /// Gateway reported failure. The gateway may retry, so `failed` can
    /// still become `paid`.
    Failed,

    /// Collected amount returned. Terminal.
    Refunded,
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Created, Paid) | (Created, Failed) | (Failed, Paid) | (Paid, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Created => vec![Paid, Failed],
            Failed => vec![Paid],
            Paid => vec![Refunded],
            Refunded => vec![],
        }
    }
}

/// What a payment was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    /// Base play-slot/event booking.
    PlayBooking,

    /// Additional guests on an existing booking.
    GuestAddon,

    /// Payment collected after a waitlist promotion.
    Waitlist,

    /// Shop order (outside the booking flow).
    ShopOrder,
}

/// Payment record for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,

    /// Gateway session/intent reference; the webhook idempotency key.
    pub external_reference: String,

    /// Current status.
    pub status: PaymentStatus,

    /// Amount in cents.
    pub amount_cents: i64,

    /// ISO 4217 currency code, lowercase.
    pub currency: String,

    /// What the payment was for.
    pub purpose: PaymentPurpose,

    /// Linked registration, when booking-related.
    pub registration_id: Option<RegistrationId>,

    /// When the checkout session was created.
    pub created_at: Timestamp,

    /// When the payment was last mutated.
    pub updated_at: Timestamp,
}

impl Payment {
    /// Create a payment record for a fresh checkout session.
    pub fn new(
        id: PaymentId,
        external_reference: impl Into<String>,
        amount_cents: i64,
        currency: impl Into<String>,
        purpose: PaymentPurpose,
        registration_id: Option<RegistrationId>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            external_reference: external_reference.into(),
            status: PaymentStatus::Created,
            amount_cents,
            currency: currency.into(),
            purpose,
            registration_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the success webhook for this payment was already
    /// applied. Used as the lookup-before-apply idempotency guard.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, PaymentStatus::Paid | PaymentStatus::Refunded)
    }

    /// Record gateway success.
    pub fn mark_paid(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(PaymentStatus::Paid)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Record gateway failure. The registration is left alone; the expiry
    /// sweep handles abandonment.
    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(PaymentStatus::Failed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Record a completed refund.
    pub fn mark_refunded(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(PaymentStatus::Refunded)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn payment() -> Payment {
        Payment::new(
            PaymentId::new(),
            "cs_test_123",
            4500,
            "usd",
            PaymentPurpose::PlayBooking,
            Some(RegistrationId::new()),
        )
    }

    #[test]
    fn new_payment_starts_created() {
        let p = payment();
        assert_eq!(p.status, PaymentStatus::Created);
        assert!(!p.is_settled());
        assert_eq!(p.amount_cents, 4500);
    }

    #[test]
    fn created_to_paid() {
        let mut p = payment();
        p.mark_paid().unwrap();
        assert_eq!(p.status, PaymentStatus::Paid);
        assert!(p.is_settled());
    }

    #[test]
    fn failed_can_recover_to_paid() {
        let mut p = payment();
        p.mark_failed().unwrap();
        p.mark_paid().unwrap();
        assert_eq!(p.status, PaymentStatus::Paid);
    }

    #[test]
    fn paid_to_refunded_is_terminal() {
        let mut p = payment();
        p.mark_paid().unwrap();
        p.mark_refunded().unwrap();

        assert_eq!(p.status, PaymentStatus::Refunded);
        assert!(PaymentStatus::Refunded.is_terminal());
        assert_eq!(p.mark_paid().unwrap_err().code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn cannot_refund_unpaid_payment() {
        let mut p = payment();
        assert!(p.mark_refunded().is_err());

        p.mark_failed().unwrap();
        assert!(p.mark_refunded().is_err());
    }

    #[test]
    fn double_paid_is_rejected_by_the_table() {
        let mut p = payment();
        p.mark_paid().unwrap();
        assert!(p.mark_paid().is_err());
    }

    #[test]
    fn purpose_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentPurpose::GuestAddon).unwrap();
        assert_eq!(json, "\"guest_addon\"");
    }
}
