//! HTTP handlers for reward endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::api_error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::rewards::{ClaimPointsCommand, SpendPointsCommand};
use crate::domain::foundation::EventId;

use super::dto::{
    ClaimPointsRequest, ClaimPointsResponse, RewardAccountResponse, SpendPointsRequest,
    SpendPointsResponse, UnclaimedPointsResponse,
};

/// GET /rewards - Balance plus ledger history for the caller.
pub async fn get_reward_account(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.reward_account_handler();
    let account = handler.handle(&claims.user_id).await?;

    Ok(Json(RewardAccountResponse::from(account)))
}

/// GET /rewards/unclaimed - Claimable attendance points for the caller.
pub async fn get_unclaimed_points(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.unclaimed_points_handler();
    let unclaimed = handler.handle(&claims.user_id).await?;

    Ok(Json(UnclaimedPointsResponse::from(unclaimed)))
}

/// POST /rewards/claim - Claim attendance points for a completed event.
pub async fn claim_points(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(request): Json<ClaimPointsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.claim_points_handler();
    let command = ClaimPointsCommand {
        user_id: claims.user_id,
        event_id: EventId::from_uuid(request.event_id),
    };

    let result = handler.handle(command).await?;

    Ok(Json(ClaimPointsResponse::from(result)))
}

/// POST /rewards/spend - Spend points against a booking.
pub async fn spend_points(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(request): Json<SpendPointsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.spend_points_handler();
    let command = SpendPointsCommand {
        user_id: claims.user_id,
        points: request.points,
        booking_ref: request.booking_ref,
    };

    let result = handler.handle(command).await?;

    Ok(Json(SpendPointsResponse::from(result)))
}
