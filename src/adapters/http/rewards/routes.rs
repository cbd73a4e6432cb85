//! Axum router configuration for reward endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{claim_points, get_reward_account, get_unclaimed_points, spend_points};

/// Create the rewards API router.
///
/// # Routes
/// - `GET /` - Balance and ledger history
/// - `GET /unclaimed` - Claimable attendance points
/// - `POST /claim` - Claim points for a completed event
/// - `POST /spend` - Spend points against a booking
pub fn reward_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_reward_account))
        .route("/unclaimed", get(get_unclaimed_points))
        .route("/claim", post(claim_points))
        .route("/spend", post(spend_points))
}
