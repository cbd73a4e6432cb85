//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the booking domain. Monetary amounts are carried as i64
//! cents everywhere; floats never touch money.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{EventId, PaymentId, RegistrationId, TransactionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
