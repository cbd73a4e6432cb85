//! Command and query handlers, grouped by surface.

pub mod booking;
pub mod jobs;
pub mod payment;
pub mod rewards;
