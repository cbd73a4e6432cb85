//! HTTP handlers for scheduler-triggered reconciliation sweeps.

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::adapters::http::api_error::{ApiError, ErrorResponse};
use crate::adapters::http::state::AppState;

const TRIGGER_HEADER: &str = "X-Trigger-Secret";

/// Checks the scheduler's shared secret before any sweep runs.
///
/// Constant-time comparison so the check leaks nothing about the secret.
fn authorize_trigger(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let presented = headers
        .get(TRIGGER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let expected = state.jobs_trigger_secret.expose_secret();
    if presented.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        tracing::warn!("job trigger rejected: bad or missing secret");
        let body = ErrorResponse::new("UNAUTHORIZED", "Invalid trigger secret");
        Err((StatusCode::UNAUTHORIZED, Json(body)).into_response())
    }
}

/// POST /jobs/expire-pending - Expire overdue pending registrations and
/// promote from the waitlist into the freed capacity.
pub async fn run_expire_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Err(rejection) = authorize_trigger(&state, &headers) {
        return Ok(rejection);
    }

    let report = state.expire_pending_sweep_handler().handle().await?;
    tracing::info!(
        scanned = report.scanned,
        expired = report.expired,
        promoted = report.promoted,
        errors = report.errors.len(),
        "expire-pending sweep finished"
    );

    Ok(Json(report).into_response())
}

/// POST /jobs/process-refunds - Refund registrations owed money: cancelled
/// ones once their event has passed, expired-but-paid ones immediately.
pub async fn run_process_refunds(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Err(rejection) = authorize_trigger(&state, &headers) {
        return Ok(rejection);
    }

    let report = state.refund_sweep_handler().handle().await?;
    tracing::info!(
        scanned = report.scanned,
        refunded = report.refunded,
        deferred = report.skipped_future_event,
        errors = report.errors.len(),
        "refund sweep finished"
    );

    Ok(Json(report).into_response())
}
