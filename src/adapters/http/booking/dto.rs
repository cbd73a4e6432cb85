//! Request and response types for booking endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::booking::{CancelRegistrationResult, CreateBookingResult};
use crate::domain::foundation::Timestamp;
use crate::domain::registration::{Registration, RegistrationStatus};

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: Uuid,
    /// Guests accompanying the member. Defaults to a solo booking.
    #[serde(default)]
    pub guest_count: u32,
}

/// A registration as exposed over the API.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
    pub guest_count: u32,
    pub party_size: u32,
    pub amount_paid_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
}

impl From<Registration> for BookingResponse {
    fn from(registration: Registration) -> Self {
        Self {
            id: *registration.id.as_uuid(),
            event_id: *registration.event_id.as_uuid(),
            status: registration.status,
            guest_count: registration.guest_count,
            party_size: registration.party_size(),
            amount_paid_cents: registration.amount_paid_cents,
            waitlist_position: registration.waitlist_position,
            payment_expires_at: registration.payment_expires_at,
            created_at: registration.created_at,
            cancelled_at: registration.cancelled_at,
        }
    }
}

/// Response for `POST /bookings`.
///
/// `checkout_url` is set when capacity was reserved and payment is due;
/// `waitlist_position` when the event was full.
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_position: Option<u32>,
}

impl From<CreateBookingResult> for CreateBookingResponse {
    fn from(result: CreateBookingResult) -> Self {
        match result {
            CreateBookingResult::PendingPayment {
                registration,
                checkout_url,
            } => Self {
                booking: BookingResponse::from(registration),
                checkout_url: Some(checkout_url),
                waitlist_position: None,
            },
            CreateBookingResult::Waitlisted {
                registration,
                position,
            } => Self {
                booking: BookingResponse::from(registration),
                checkout_url: None,
                waitlist_position: Some(position),
            },
        }
    }
}

/// Response for `DELETE /bookings/:id`.
#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    pub booking: BookingResponse,
    /// Waitlist entries promoted into the freed capacity, in queue order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub promoted: Vec<BookingResponse>,
}

impl From<CancelRegistrationResult> for CancelBookingResponse {
    fn from(result: CancelRegistrationResult) -> Self {
        Self {
            booking: BookingResponse::from(result.registration),
            promoted: result
                .promoted
                .into_iter()
                .map(BookingResponse::from)
                .collect(),
        }
    }
}

/// Response for `GET /bookings`.
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, RegistrationId, UserId};

    fn waitlisted_registration() -> Registration {
        Registration::new_waitlisted(
            RegistrationId::new(),
            UserId::new(),
            EventId::new(),
            1,
            3,
        )
    }

    #[test]
    fn booking_response_omits_absent_fields() {
        let mut registration = waitlisted_registration();
        registration.waitlist_position = None;

        let json =
            serde_json::to_value(BookingResponse::from(registration)).expect("serializes");
        assert_eq!(json["status"], "waitlisted");
        assert_eq!(json["party_size"], 2);
        assert!(json.get("waitlist_position").is_none());
        assert!(json.get("cancelled_at").is_none());
    }

    #[test]
    fn create_response_carries_waitlist_position() {
        let result = CreateBookingResult::Waitlisted {
            registration: waitlisted_registration(),
            position: 3,
        };

        let response = CreateBookingResponse::from(result);
        assert_eq!(response.waitlist_position, Some(3));
        assert!(response.checkout_url.is_none());
    }
}
