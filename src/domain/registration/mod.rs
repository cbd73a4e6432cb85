//! Registration domain - booking lifecycle for events and play slots.

mod aggregate;
mod status;

pub use aggregate::Registration;
pub use status::RegistrationStatus;
