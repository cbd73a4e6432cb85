//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// URL members are redirected to after successful checkout
    pub checkout_success_url: String,

    /// URL members are redirected to after abandoned checkout
    pub checkout_cancel_url: String,

    /// Minutes a pending registration may wait for payment before the
    /// expiry sweep reclaims the slot
    #[serde(default = "default_payment_timeout_mins")]
    pub pending_payment_timeout_mins: u32,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !self.checkout_success_url.starts_with("http")
            || !self.checkout_cancel_url.starts_with("http")
        {
            return Err(ValidationError::InvalidCheckoutUrl);
        }

        if self.pending_payment_timeout_mins < 5 || self.pending_payment_timeout_mins > 1440 {
            return Err(ValidationError::InvalidPaymentTimeout);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            checkout_success_url: String::new(),
            checkout_cancel_url: String::new(),
            pending_payment_timeout_mins: default_payment_timeout_mins(),
        }
    }
}

fn default_payment_timeout_mins() -> u32 {
    30
}
