//! Scriptable payment gateway for tests and local development.

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, GatewayErrorCode, PaymentGateway, Refund,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Gateway double that records calls and can be scripted to fail.
///
/// Session ids are deterministic (`cs_test_1`, `cs_test_2`, ...) so tests
/// can feed them back through the webhook path.
pub struct ScriptedPaymentGateway {
    checkout_requests: Mutex<Vec<CreateCheckoutRequest>>,
    refunded_references: Mutex<Vec<String>>,
    session_counter: AtomicU64,
    fail_checkout: AtomicBool,
    fail_refund: AtomicBool,
}

impl ScriptedPaymentGateway {
    pub fn new() -> Self {
        Self {
            checkout_requests: Mutex::new(Vec::new()),
            refunded_references: Mutex::new(Vec::new()),
            session_counter: AtomicU64::new(0),
            fail_checkout: AtomicBool::new(false),
            fail_refund: AtomicBool::new(false),
        }
    }

    /// Make every subsequent checkout call fail with a network error.
    pub fn fail_next_checkouts(&self) {
        self.fail_checkout.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent refund call fail with a network error.
    pub fn fail_next_refunds(&self) {
        self.fail_refund.store(true, Ordering::SeqCst);
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.checkout_requests.lock().unwrap().clone()
    }

    /// Payment references refunded so far.
    pub fn refunded_references(&self) -> Vec<String> {
        self.refunded_references.lock().unwrap().clone()
    }
}

impl Default for ScriptedPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if self.fail_checkout.load(Ordering::SeqCst) {
            return Err(GatewayError::network("gateway unreachable"));
        }

        let n = self.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.checkout_requests.lock().unwrap().push(request);

        Ok(CheckoutSession {
            id: format!("cs_test_{}", n),
            url: format!("https://checkout.test/cs_test_{}", n),
            expires_at: 0,
        })
    }

    async fn issue_refund(&self, payment_reference: &str) -> Result<Refund, GatewayError> {
        if self.fail_refund.load(Ordering::SeqCst) {
            return Err(GatewayError::network("gateway unreachable"));
        }
        if payment_reference.is_empty() {
            return Err(GatewayError::new(
                GatewayErrorCode::NotFound,
                "empty payment reference",
            ));
        }

        self.refunded_references
            .lock()
            .unwrap()
            .push(payment_reference.to_string());

        Ok(Refund {
            id: format!("re_test_{}", payment_reference),
            amount_cents: 0,
        })
    }
}
