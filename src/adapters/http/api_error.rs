//! HTTP error mapping for domain errors.
//!
//! Every route handler returns `Result<_, ApiError>`; the `From<DomainError>`
//! impl plus `?` keeps the mapping in one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Standard JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code.
    pub code: String,

    /// Human-readable message.
    pub error: String,

    /// Optional structured details (e.g. the offending field).
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub details: std::collections::HashMap<String, String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
            details: std::collections::HashMap::new(),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

/// Map an error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,

        ErrorCode::EventNotFound
        | ErrorCode::RegistrationNotFound
        | ErrorCode::PaymentNotFound
        | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,

        ErrorCode::InvalidStateTransition
        | ErrorCode::DuplicateRegistration
        | ErrorCode::AlreadyClaimed
        | ErrorCode::InsufficientBalance => StatusCode::CONFLICT,

        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::GatewayError | ErrorCode::EmailError => StatusCode::BAD_GATEWAY,

        ErrorCode::DatabaseError | ErrorCode::InvariantViolation | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.code);

        if status.is_server_error() {
            tracing::error!(code = %self.0.code, error = %self.0.message, "Request failed");
        }

        // Internal messages may carry SQL or provider detail; never leak them.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.0.message
        };

        let body = ErrorResponse {
            code: self.0.code.to_string(),
            error: message,
            details: if status.is_server_error() {
                Default::default()
            } else {
                self.0.details
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status_for(ErrorCode::ValidationFailed),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_family_maps_to_404() {
        assert_eq!(status_for(ErrorCode::EventNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorCode::RegistrationNotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_family_maps_to_409() {
        assert_eq!(status_for(ErrorCode::AlreadyClaimed), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorCode::InsufficientBalance),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(ErrorCode::DuplicateRegistration),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(ErrorCode::InvalidStateTransition),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn auth_codes_map_to_401_and_403() {
        assert_eq!(status_for(ErrorCode::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn upstream_failures_map_to_502() {
        assert_eq!(status_for(ErrorCode::GatewayError), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_error_hides_message() {
        let err = ApiError(DomainError::database("connection refused: 10.0.0.3"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_error_keeps_details() {
        let err = ApiError(DomainError::validation("guest_count", "too many guests"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
