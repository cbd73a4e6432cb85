//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own endpoint group; `build_router` assembles
//! them into the full API surface.

pub mod admin;
pub mod api_error;
pub mod booking;
pub mod jobs;
pub mod middleware;
pub mod rewards;
pub mod state;
pub mod webhooks;

pub use api_error::{ApiError, ErrorResponse};
pub use state::AppState;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use middleware::{auth_middleware, AuthState};

/// GET /health - Liveness check.
async fn health() -> &'static str {
    "ok"
}

/// Assemble the complete API router.
///
/// Bearer auth runs across the whole `/api` surface. Webhook and job routes
/// sit under it too but never read the claims; they carry their own
/// verification (gateway signature, scheduler shared secret).
pub fn build_router(state: AppState) -> Router {
    let verifier: AuthState = Arc::clone(&state.token_verifier);

    let api = Router::new()
        .nest("/bookings", booking::booking_routes())
        .nest("/rewards", rewards::reward_routes())
        .nest("/admin", admin::admin_routes())
        .nest("/webhooks", webhooks::webhook_routes())
        .nest("/jobs", jobs::job_routes())
        .layer(axum::middleware::from_fn_with_state(
            verifier,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
