//! Read-side handlers for bookings.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, RegistrationId, UserId};
use crate::domain::registration::Registration;
use crate::ports::RegistrationRepository;

/// Lists a user's bookings, newest first.
pub struct ListUserBookingsHandler {
    registrations: Arc<dyn RegistrationRepository>,
}

impl ListUserBookingsHandler {
    pub fn new(registrations: Arc<dyn RegistrationRepository>) -> Self {
        Self { registrations }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        self.registrations.list_for_user(user_id).await
    }
}

/// Fetches a single booking, enforcing ownership for non-admin callers.
pub struct GetBookingHandler {
    registrations: Arc<dyn RegistrationRepository>,
}

impl GetBookingHandler {
    pub fn new(registrations: Arc<dyn RegistrationRepository>) -> Self {
        Self { registrations }
    }

    pub async fn handle(
        &self,
        registration_id: &RegistrationId,
        acting_user: Option<&UserId>,
    ) -> Result<Registration, DomainError> {
        let registration = self
            .registrations
            .find_by_id(registration_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::RegistrationNotFound,
                    format!("registration {} not found", registration_id),
                )
            })?;

        if let Some(acting_user) = acting_user {
            if &registration.user_id != acting_user {
                return Err(DomainError::new(
                    ErrorCode::Forbidden,
                    "registration belongs to another user",
                ));
            }
        }

        Ok(registration)
    }
}

/// Lists every registration for an event, waitlist in queue order.
///
/// Admin-only; used by the dashboard's attendee view.
pub struct ListEventRegistrationsHandler {
    registrations: Arc<dyn RegistrationRepository>,
}

impl ListEventRegistrationsHandler {
    pub fn new(registrations: Arc<dyn RegistrationRepository>) -> Self {
        Self { registrations }
    }

    pub async fn handle(&self, event_id: &EventId) -> Result<Vec<Registration>, DomainError> {
        self.registrations.list_for_event(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRegistrationRepository;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn get_booking_enforces_ownership() {
        let repo = Arc::new(InMemoryRegistrationRepository::new());
        let owner = UserId::new();
        let registration = Registration::new_pending_payment(
            RegistrationId::new(),
            owner,
            EventId::new(),
            0,
            Timestamp::now().plus_minutes(30),
        );
        repo.insert_pending_if_capacity(&registration, 10)
            .await
            .unwrap();

        let handler = GetBookingHandler::new(repo);

        let found = handler
            .handle(&registration.id, Some(&owner))
            .await
            .unwrap();
        assert_eq!(found.id, registration.id);

        let stranger = UserId::new();
        let err = handler
            .handle(&registration.id, Some(&stranger))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        // Admin callers pass no user and skip the check
        assert!(handler.handle(&registration.id, None).await.is_ok());
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let repo = Arc::new(InMemoryRegistrationRepository::new());
        let handler = GetBookingHandler::new(repo);

        let err = handler
            .handle(&RegistrationId::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistrationNotFound);
    }
}
