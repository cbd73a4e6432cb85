//! Axum router configuration for admin endpoints.

use axum::routing::{get, patch};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{list_event_registrations, update_registration_status};

/// Create the admin API router. Every route requires the admin role.
///
/// # Routes
/// - `PATCH /registrations/:id/status` - Force a lifecycle transition
/// - `GET /events/:id/registrations` - All registrations for an event
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/registrations/:id/status", patch(update_registration_status))
        .route("/events/:id/registrations", get(list_event_registrations))
}
