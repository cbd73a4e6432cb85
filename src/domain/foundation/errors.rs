//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
///
/// The code determines how callers treat the failure: validation, not-found,
/// conflict, and auth errors are terminal for the request; upstream and
/// database errors are safe to retry; invariant violations abort loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    EventNotFound,
    RegistrationNotFound,
    PaymentNotFound,
    UserNotFound,

    // Conflict errors
    InvalidStateTransition,
    DuplicateRegistration,
    AlreadyClaimed,
    InsufficientBalance,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Upstream/dependency errors
    GatewayError,
    EmailError,
    DatabaseError,

    // Internal errors
    InvariantViolation,
    InternalError,
}

impl ErrorCode {
    /// Returns true if operations failing with this code may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::GatewayError | ErrorCode::EmailError | ErrorCode::DatabaseError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EventNotFound => "EVENT_NOT_FOUND",
            ErrorCode::RegistrationNotFound => "REGISTRATION_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            ErrorCode::AlreadyClaimed => "ALREADY_CLAIMED",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::GatewayError => "GATEWAY_ERROR",
            ErrorCode::EmailError => "EMAIL_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    /// Creates a database error from an underlying cause.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Creates an authentication error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an invariant-violation error.
    ///
    /// Used when the ledger or capacity invariants would be broken; the
    /// caller must abort without partial effect.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvariantViolation, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true if the failed operation may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::RegistrationNotFound, "Registration not found");
        assert_eq!(
            format!("{}", err),
            "[REGISTRATION_NOT_FOUND] Registration not found"
        );
    }

    #[test]
    fn validation_error_carries_field_detail() {
        let err = DomainError::validation("guest_count", "Guest count too large");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"guest_count".to_string()));
    }

    #[test]
    fn with_detail_accumulates() {
        let err = DomainError::new(ErrorCode::InvalidStateTransition, "Cannot confirm")
            .with_detail("from", "expired")
            .with_detail("to", "confirmed");

        assert_eq!(err.details.len(), 2);
        assert_eq!(err.details.get("from"), Some(&"expired".to_string()));
    }

    #[test]
    fn retryability_follows_error_category() {
        assert!(DomainError::database("connection reset").is_retryable());
        assert!(DomainError::new(ErrorCode::GatewayError, "timeout").is_retryable());

        assert!(!DomainError::new(ErrorCode::AlreadyClaimed, "claimed").is_retryable());
        assert!(!DomainError::validation("points", "negative").is_retryable());
        assert!(!DomainError::invariant("balance drift").is_retryable());
    }
}
