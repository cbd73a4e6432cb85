//! Resend email notifier adapter.
//!
//! Sends transactional booking emails through the Resend HTTP API. Message
//! bodies are small inline HTML; anything fancier belongs in provider-side
//! templates.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::registration::Registration;
use crate::ports::EmailNotifier;

/// Resend notifier configuration.
#[derive(Clone)]
pub struct ResendConfig {
    /// Resend API key (re_...).
    api_key: SecretString,

    /// From header, e.g. "Slotbook <noreply@slotbook.example>".
    from: String,

    /// Base URL for the Resend API (default: https://api.resend.com).
    api_base_url: String,

    /// Currency code used when a message has no event context (refunds).
    currency: String,
}

impl ResendConfig {
    /// Create a new Resend configuration.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            api_base_url: "https://api.resend.com".to_string(),
            currency: "eur".to_string(),
        }
    }

    /// Override the fallback currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Email notifier backed by the Resend API.
pub struct ResendNotifier {
    config: ResendConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

impl ResendNotifier {
    /// Create a new notifier with the given configuration.
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn send(
        &self,
        recipient: &str,
        subject: String,
        html: String,
    ) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.config.api_base_url);

        let body = SendEmailRequest {
            from: &self.config.from,
            to: [recipient],
            subject,
            html,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::EmailError, format!("Email send failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Resend API error");
            return Err(DomainError::new(
                ErrorCode::EmailError,
                format!("Email provider returned {}", status),
            ));
        }

        Ok(())
    }
}

fn format_amount(amount_cents: i64, currency: &str) -> String {
    format!(
        "{}.{:02} {}",
        amount_cents / 100,
        (amount_cents % 100).abs(),
        currency.to_uppercase()
    )
}

#[async_trait]
impl EmailNotifier for ResendNotifier {
    async fn booking_confirmed(
        &self,
        recipient: &str,
        registration: &Registration,
        event: &PlayEvent,
    ) -> Result<(), DomainError> {
        let subject = format!("Booking confirmed: {}", event.name);
        let html = format!(
            "<p>Your booking for <strong>{}</strong> is confirmed.</p>\
             <p>Party size: {}<br>Amount paid: {}</p>",
            event.name,
            registration.party_size(),
            format_amount(registration.amount_paid_cents, &event.currency),
        );
        self.send(recipient, subject, html).await
    }

    async fn waitlist_promoted(
        &self,
        recipient: &str,
        registration: &Registration,
        event: &PlayEvent,
    ) -> Result<(), DomainError> {
        let subject = format!("A spot opened up: {}", event.name);
        let deadline = registration
            .payment_expires_at
            .map(|t| t.as_datetime().format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "soon".to_string());
        let html = format!(
            "<p>You have been promoted from the waitlist for \
             <strong>{}</strong>.</p>\
             <p>Complete your payment before {} to keep your spot.</p>",
            event.name, deadline,
        );
        self.send(recipient, subject, html).await
    }

    async fn refund_issued(
        &self,
        recipient: &str,
        _registration: &Registration,
        amount_cents: i64,
    ) -> Result<(), DomainError> {
        let subject = "Your refund is on its way".to_string();
        let html = format!(
            "<p>We have refunded {} for your cancelled booking. It should \
             appear on your statement within a few business days.</p>",
            format_amount(amount_cents, &self.config.currency),
        );
        self.send(recipient, subject, html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_sets_default_base_url() {
        let config = ResendConfig::new("re_test", "Slotbook <noreply@slotbook.example>");
        assert_eq!(config.api_base_url, "https://api.resend.com");
    }

    #[test]
    fn format_amount_pads_cents() {
        assert_eq!(format_amount(4500, "eur"), "45.00 EUR");
        assert_eq!(format_amount(105, "eur"), "1.05 EUR");
        assert_eq!(format_amount(99, "usd"), "0.99 USD");
    }

    #[test]
    fn send_request_serializes_to_resend_shape() {
        let body = SendEmailRequest {
            from: "Slotbook <noreply@slotbook.example>",
            to: ["member@example.com"],
            subject: "Booking confirmed: Friday Padel".to_string(),
            html: "<p>hi</p>".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "member@example.com");
        assert_eq!(json["subject"], "Booking confirmed: Friday Padel");
    }
}
