//! Booking command and query handlers.

pub mod booking_queries;
pub mod cancel_registration;
pub mod create_booking;
pub mod update_registration_status;
pub mod waitlist_promotion;

pub use booking_queries::{GetBookingHandler, ListEventRegistrationsHandler, ListUserBookingsHandler};
pub use cancel_registration::{
    CancelRegistrationCommand, CancelRegistrationHandler, CancelRegistrationResult,
};
pub use create_booking::{
    CheckoutUrls, CreateBookingCommand, CreateBookingHandler, CreateBookingResult,
};
pub use update_registration_status::{
    UpdateRegistrationStatusCommand, UpdateRegistrationStatusHandler,
};
pub use waitlist_promotion::WaitlistPromotion;
