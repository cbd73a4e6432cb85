//! Reward endpoints: account projection, claims and spends.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::reward_routes;
