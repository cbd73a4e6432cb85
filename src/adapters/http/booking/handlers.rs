//! HTTP handlers for booking endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::adapters::http::api_error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::booking::{CancelRegistrationCommand, CreateBookingCommand};
use crate::domain::foundation::{EventId, RegistrationId};

use super::dto::{
    BookingListResponse, BookingResponse, CancelBookingResponse, CreateBookingRequest,
    CreateBookingResponse,
};

/// POST /bookings - Book a place at an event.
pub async fn create_booking(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_booking_handler();
    let command = CreateBookingCommand {
        user_id: claims.user_id,
        event_id: EventId::from_uuid(request.event_id),
        guest_count: request.guest_count,
    };

    let result = handler.handle(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse::from(result)),
    ))
}

/// GET /bookings - List the caller's bookings.
pub async fn list_bookings(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_user_bookings_handler();
    let bookings = handler.handle(&claims.user_id).await?;

    Ok(Json(BookingListResponse {
        bookings: bookings.into_iter().map(BookingResponse::from).collect(),
    }))
}

/// GET /bookings/:id - Fetch one booking. Admins may fetch any booking.
pub async fn get_booking(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.get_booking_handler();
    let acting_user = (!claims.is_admin()).then_some(&claims.user_id);
    let registration = handler
        .handle(&RegistrationId::from_uuid(id), acting_user)
        .await?;

    Ok(Json(BookingResponse::from(registration)))
}

/// DELETE /bookings/:id - Cancel a booking, promoting from the waitlist
/// when a confirmed slot opens up.
pub async fn cancel_booking(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancel_registration_handler();
    let command = CancelRegistrationCommand {
        registration_id: RegistrationId::from_uuid(id),
        acting_user: (!claims.is_admin()).then_some(claims.user_id),
    };

    let result = handler.handle(command).await?;

    Ok(Json(CancelBookingResponse::from(result)))
}
