//! Axum router configuration for webhook endpoints.
//!
//! Separate from the authenticated API surface: webhooks carry no bearer
//! token and are verified via the gateway signature instead.

use axum::routing::post;
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::handle_payment_webhook;

/// Create the webhook router.
///
/// # Routes
/// - `POST /payment` - Signed payment gateway deliveries
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}
