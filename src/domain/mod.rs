//! Domain layer: pure business types and rules, no I/O.

pub mod events;
pub mod foundation;
pub mod payment;
pub mod registration;
pub mod rewards;
