//! Play events: the bookable sessions registrations attach to.

use crate::domain::foundation::{EventId, Timestamp};
use serde::{Deserialize, Serialize};

/// A scheduled club event with a fixed capacity and per-seat price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Unique identifier.
    pub id: EventId,

    /// Display name.
    pub name: String,

    /// Maximum confirmed + pending party members across all registrations.
    pub capacity: u32,

    /// Price per seat in minor currency units.
    pub price_cents: i64,

    /// ISO 4217 currency code, lowercase.
    pub currency: String,

    /// When the event takes place.
    pub scheduled_at: Timestamp,

    /// Points a member earns for attending, claimable after completion.
    pub reward_points: i64,
}

impl PlayEvent {
    /// Total charge for a party of the given size.
    pub fn price_for_party(&self, party_size: u32) -> i64 {
        self.price_cents * party_size as i64
    }

    /// Whether the event date has passed.
    pub fn has_finished(&self, now: Timestamp) -> bool {
        self.scheduled_at.is_before(&now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> PlayEvent {
        PlayEvent {
            id: EventId::new(),
            name: "Friday Social".to_string(),
            capacity: 20,
            price_cents: 1500,
            currency: "gbp".to_string(),
            scheduled_at: Timestamp::now().plus_days(7),
            reward_points: 50,
        }
    }

    #[test]
    fn party_price_is_per_seat() {
        let event = sample_event();
        assert_eq!(event.price_for_party(1), 1500);
        assert_eq!(event.price_for_party(3), 4500);
    }

    #[test]
    fn future_event_has_not_finished() {
        let event = sample_event();
        assert!(!event.has_finished(Timestamp::now()));
    }

    #[test]
    fn past_event_has_finished() {
        let mut event = sample_event();
        event.scheduled_at = Timestamp::now().minus_days(1);
        assert!(event.has_finished(Timestamp::now()));
    }
}
