//! Application layer: orchestrates domain types through the ports.

pub mod handlers;
