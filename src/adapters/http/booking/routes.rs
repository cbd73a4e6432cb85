//! Axum router configuration for booking endpoints.

use axum::routing::get;
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{cancel_booking, create_booking, get_booking, list_bookings};

/// Create the booking API router.
///
/// # Routes
/// - `POST /` - Book a place at an event (or join the waitlist)
/// - `GET /` - List the caller's bookings
/// - `GET /:id` - Fetch a single booking
/// - `DELETE /:id` - Cancel a booking
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/:id", get(get_booking).delete(cancel_booking))
}
