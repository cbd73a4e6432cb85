//! HTTP handlers for the admin surface.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::adapters::http::api_error::ApiError;
use crate::adapters::http::booking::dto::{BookingListResponse, BookingResponse};
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::booking::UpdateRegistrationStatusCommand;
use crate::domain::foundation::{EventId, RegistrationId};

use super::dto::UpdateStatusRequest;

/// PATCH /admin/registrations/:id/status - Force a lifecycle transition.
///
/// Goes through the same transition table as every other path, so an
/// invalid move is rejected with a conflict rather than applied.
pub async fn update_registration_status(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        admin = %claims.user_id,
        registration = %id,
        target = ?request.status,
        "admin status update"
    );

    let handler = state.update_registration_status_handler();
    let command = UpdateRegistrationStatusCommand {
        registration_id: RegistrationId::from_uuid(id),
        new_status: request.status,
    };

    let registration = handler.handle(command).await?;

    Ok(Json(BookingResponse::from(registration)))
}

/// GET /admin/events/:id/registrations - All registrations for an event.
pub async fn list_event_registrations(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_event_registrations_handler();
    let registrations = handler.handle(&EventId::from_uuid(id)).await?;

    Ok(Json(BookingListResponse {
        bookings: registrations
            .into_iter()
            .map(BookingResponse::from)
            .collect(),
    }))
}
