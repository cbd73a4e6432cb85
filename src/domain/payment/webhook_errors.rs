//! Webhook error types for payment-gateway webhook handling.
//!
//! Status-code mapping determines the gateway's retry behavior: 2xx is
//! acknowledged, 4xx is dropped, 5xx is redelivered.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature verification failed. Forged or corrupted event.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is older than the acceptance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock-skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or JSON payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No Payment record matches the event's external reference.
    #[error("Unknown payment reference: {0}")]
    UnknownPaymentReference(String),

    /// The registration linked to the payment could not be loaded.
    #[error("Registration not found for payment {0}")]
    RegistrationNotFound(String),

    /// Attempted state transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_)
                // The payment row may not be committed yet when the gateway
                // delivers faster than the booking transaction.
                | WebhookError::UnknownPaymentReference(_)
                | WebhookError::RegistrationNotFound(_)
        )
    }

    /// Maps the error to the HTTP status returned to the gateway.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::InvalidTimestamp | WebhookError::ParseError(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::UnknownPaymentReference(_)
            | WebhookError::RegistrationNotFound(_)
            | WebhookError::InvalidTransition(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failures_map_to_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn malformed_input_maps_to_bad_request() {
        assert_eq!(
            WebhookError::ParseError("bad json".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::InvalidTimestamp.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn transient_failures_request_redelivery() {
        let err = WebhookError::UnknownPaymentReference("pi_1".into());
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert!(WebhookError::Database("pool timeout".into()).is_retryable());
    }

    #[test]
    fn auth_failures_are_never_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::ParseError("x".into()).is_retryable());
        assert!(!WebhookError::InvalidTransition("x".into()).is_retryable());
    }

    #[test]
    fn display_carries_reference() {
        let err = WebhookError::UnknownPaymentReference("pi_9".into());
        assert_eq!(format!("{}", err), "Unknown payment reference: pi_9");
    }
}
