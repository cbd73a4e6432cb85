//! Event directory port.
//!
//! Read-only lookup of play events. Event authoring lives in the admin
//! surface elsewhere; the booking flow only needs to resolve an event's
//! capacity, price and schedule.

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, EventId};
use async_trait::async_trait;

/// Read port for play events.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    /// Find an event by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<PlayEvent>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn event_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn EventDirectory) {}
    }
}
