//! Booking endpoints: create, list, fetch and cancel registrations.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::booking_routes;
