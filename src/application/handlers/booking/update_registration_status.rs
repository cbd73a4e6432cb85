//! UpdateRegistrationStatusHandler - admin-driven status changes.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, RegistrationId};
use crate::domain::registration::{Registration, RegistrationStatus};
use crate::ports::{EventDirectory, RegistrationRepository};

use super::waitlist_promotion::WaitlistPromotion;

/// Command for a dashboard status edit.
#[derive(Debug, Clone)]
pub struct UpdateRegistrationStatusCommand {
    pub registration_id: RegistrationId,
    pub new_status: RegistrationStatus,
}

/// Handler for admin status updates.
///
/// Dashboard edits go through the same transition table as every other
/// path, so an admin cannot put a registration into a state the lifecycle
/// forbids. Cancelling a slot-holding registration promotes the waitlist,
/// same as a member-initiated cancellation.
pub struct UpdateRegistrationStatusHandler {
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventDirectory>,
    promotion: Arc<WaitlistPromotion>,
}

impl UpdateRegistrationStatusHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        events: Arc<dyn EventDirectory>,
        promotion: Arc<WaitlistPromotion>,
    ) -> Self {
        Self {
            registrations,
            events,
            promotion,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateRegistrationStatusCommand,
    ) -> Result<Registration, DomainError> {
        let mut registration = self
            .registrations
            .find_by_id(&cmd.registration_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::RegistrationNotFound,
                    format!("registration {} not found", cmd.registration_id),
                )
            })?;

        let held_slot = registration.status.holds_capacity_slot();
        registration.apply_transition(cmd.new_status)?;
        self.registrations.update(&registration).await?;

        if held_slot && cmd.new_status == RegistrationStatus::Cancelled {
            if let Ok(Some(event)) = self.events.find_by_id(&registration.event_id).await {
                if let Err(err) = self.promotion.promote_available(&event).await {
                    tracing::warn!(
                        event_id = %registration.event_id,
                        error = %err,
                        "waitlist promotion after admin cancellation failed"
                    );
                }
            }
        }

        Ok(registration)
    }
}
