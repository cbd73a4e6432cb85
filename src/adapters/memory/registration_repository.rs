//! In-memory registration repository.

use crate::domain::foundation::{DomainError, ErrorCode, EventId, RegistrationId, Timestamp, UserId};
use crate::domain::registration::{Registration, RegistrationStatus};
use crate::ports::RegistrationRepository;
use async_trait::async_trait;
use std::sync::Mutex;

/// Mutex-backed registration store for tests and local development.
///
/// Mirrors the postgres adapter's semantics, including the atomic capacity
/// check (the whole store is behind one lock, so every operation is atomic).
#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    registrations: Mutex<Vec<Registration>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registrations(registrations: Vec<Registration>) -> Self {
        Self {
            registrations: Mutex::new(registrations),
        }
    }

    /// Snapshot of all stored registrations.
    pub fn all(&self) -> Vec<Registration> {
        self.registrations.lock().unwrap().clone()
    }

    fn has_active(&self, registrations: &[Registration], user_id: &UserId, event_id: &EventId) -> bool {
        registrations
            .iter()
            .any(|r| &r.user_id == user_id && &r.event_id == event_id && r.status.is_active())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn insert_pending_if_capacity(
        &self,
        registration: &Registration,
        max_capacity: u32,
    ) -> Result<bool, DomainError> {
        let mut registrations = self.registrations.lock().unwrap();

        if self.has_active(&registrations, &registration.user_id, &registration.event_id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateRegistration,
                "user already has an active registration for this event",
            ));
        }

        let used: u32 = registrations
            .iter()
            .filter(|r| r.event_id == registration.event_id && r.status.holds_capacity_slot())
            .map(|r| r.party_size())
            .sum();

        if used + registration.party_size() > max_capacity {
            return Ok(false);
        }

        registrations.push(registration.clone());
        Ok(true)
    }

    async fn insert_waitlisted(&self, registration: &Registration) -> Result<u32, DomainError> {
        let mut registrations = self.registrations.lock().unwrap();

        if self.has_active(&registrations, &registration.user_id, &registration.event_id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateRegistration,
                "user already has an active registration for this event",
            ));
        }

        let position = registrations
            .iter()
            .filter(|r| {
                r.event_id == registration.event_id && r.status == RegistrationStatus::Waitlisted
            })
            .filter_map(|r| r.waitlist_position)
            .max()
            .unwrap_or(0)
            + 1;

        let mut stored = registration.clone();
        stored.waitlist_position = Some(position);
        registrations.push(stored);
        Ok(position)
    }

    async fn update(&self, registration: &Registration) -> Result<(), DomainError> {
        let mut registrations = self.registrations.lock().unwrap();
        match registrations.iter_mut().find(|r| r.id == registration.id) {
            Some(existing) => {
                *existing = registration.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                format!("registration {} not found", registration.id),
            )),
        }
    }

    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations.iter().find(|r| &r.id == id).cloned())
    }

    async fn find_active_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations
            .iter()
            .find(|r| &r.user_id == user_id && &r.event_id == event_id && r.status.is_active())
            .cloned())
    }

    async fn find_completed_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations
            .iter()
            .find(|r| {
                &r.user_id == user_id
                    && &r.event_id == event_id
                    && r.status == RegistrationStatus::Completed
            })
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        let mut matching: Vec<Registration> = registrations
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.as_datetime().cmp(&a.created_at.as_datetime()));
        Ok(matching)
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        let mut matching: Vec<Registration> = registrations
            .iter()
            .filter(|r| &r.event_id == event_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.waitlist_position.unwrap_or(0));
        Ok(matching)
    }

    async fn find_pending_expired(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations
            .iter()
            .filter(|r| {
                r.status == RegistrationStatus::PendingPayment
                    && r.payment_expires_at
                        .as_ref()
                        .map(|expires| !expires.is_after(cutoff))
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn find_first_waitlisted(
        &self,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations
            .iter()
            .filter(|r| &r.event_id == event_id && r.status == RegistrationStatus::Waitlisted)
            .min_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX))
            .cloned())
    }

    async fn promote_head_if_capacity(
        &self,
        registration_id: &RegistrationId,
        event_id: &EventId,
        max_capacity: u32,
        payment_expires_at: Timestamp,
        payment_reference: &str,
    ) -> Result<Option<Registration>, DomainError> {
        let mut registrations = self.registrations.lock().unwrap();

        let head_id = registrations
            .iter()
            .filter(|r| &r.event_id == event_id && r.status == RegistrationStatus::Waitlisted)
            .min_by_key(|r| r.waitlist_position.unwrap_or(u32::MAX))
            .map(|r| r.id);
        if head_id.as_ref() != Some(registration_id) {
            // Someone else promoted or cancelled the entry in the meantime
            return Ok(None);
        }

        let used: u32 = registrations
            .iter()
            .filter(|r| &r.event_id == event_id && r.status.holds_capacity_slot())
            .map(|r| r.party_size())
            .sum();

        let entry = registrations
            .iter_mut()
            .find(|r| &r.id == registration_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::RegistrationNotFound,
                    format!("registration {} not found", registration_id),
                )
            })?;

        if used + entry.party_size() > max_capacity {
            return Ok(None);
        }

        entry.promote(payment_expires_at)?;
        entry.set_payment_reference(payment_reference);
        Ok(Some(entry.clone()))
    }

    async fn find_refund_candidates(&self) -> Result<Vec<Registration>, DomainError> {
        let registrations = self.registrations.lock().unwrap();
        // The payments store is separate, so a recorded gateway reference
        // stands in for the paid check; the sweep re-verifies per item.
        Ok(registrations
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    RegistrationStatus::Cancelled | RegistrationStatus::Expired
                ) && r.payment_reference.is_some()
            })
            .cloned()
            .collect())
    }
}
