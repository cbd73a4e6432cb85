//! Payment gateway webhook endpoint.

pub mod handlers;
pub mod routes;

pub use routes::webhook_routes;
