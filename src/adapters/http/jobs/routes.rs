//! Axum router configuration for reconciliation job triggers.
//!
//! No bearer auth; the scheduler authenticates with a shared secret header
//! checked inside the handlers before any work runs.

use axum::routing::post;
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{run_expire_pending, run_process_refunds};

/// Create the jobs router.
///
/// # Routes
/// - `POST /expire-pending` - Expire overdue holds and promote the waitlist
/// - `POST /process-refunds` - Refund cancelled-but-paid registrations
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/expire-pending", post(run_expire_pending))
        .route("/process-refunds", post(run_process_refunds))
}
