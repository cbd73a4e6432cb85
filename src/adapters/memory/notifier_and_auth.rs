//! Recording email notifier and static token verifier for tests.

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::registration::Registration;
use crate::ports::{AuthClaims, EmailNotifier, TokenVerifier};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A sent email, recorded instead of delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEmail {
    pub kind: &'static str,
    pub recipient: String,
}

/// Email notifier that records sends for assertion.
#[derive(Default)]
pub struct RecordingEmailNotifier {
    sent: Mutex<Vec<RecordedEmail>>,
}

impl RecordingEmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<RecordedEmail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, recipient: &str) {
        self.sent.lock().unwrap().push(RecordedEmail {
            kind,
            recipient: recipient.to_string(),
        });
    }
}

#[async_trait]
impl EmailNotifier for RecordingEmailNotifier {
    async fn booking_confirmed(
        &self,
        recipient: &str,
        _registration: &Registration,
        _event: &PlayEvent,
    ) -> Result<(), DomainError> {
        self.record("booking_confirmed", recipient);
        Ok(())
    }

    async fn waitlist_promoted(
        &self,
        recipient: &str,
        _registration: &Registration,
        _event: &PlayEvent,
    ) -> Result<(), DomainError> {
        self.record("waitlist_promoted", recipient);
        Ok(())
    }

    async fn refund_issued(
        &self,
        recipient: &str,
        _registration: &Registration,
        _amount_cents: i64,
    ) -> Result<(), DomainError> {
        self.record("refund_issued", recipient);
        Ok(())
    }
}

/// Token verifier backed by a static token table.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: Mutex<HashMap<String, AuthClaims>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token that verifies to the given claims.
    pub fn grant(&self, token: impl Into<String>, claims: AuthClaims) {
        self.tokens.lock().unwrap().insert(token.into(), claims);
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthClaims, DomainError> {
        let tokens = self.tokens.lock().unwrap();
        tokens.get(token).cloned().ok_or_else(|| {
            DomainError::new(ErrorCode::Unauthorized, "invalid or expired token")
        })
    }
}
