//! Admin surface: status overrides and event rosters.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::admin_routes;
