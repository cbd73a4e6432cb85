//! Request types for the admin surface.
//!
//! Responses reuse the booking DTOs; only the requests are admin-specific.

use serde::Deserialize;

use crate::domain::registration::RegistrationStatus;

/// Request body for `PATCH /admin/registrations/:id/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RegistrationStatus,
}
