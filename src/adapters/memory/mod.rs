//! In-memory port implementations.
//!
//! Used by handler tests and the integration suite, and handy for running
//! the service locally without postgres or a gateway account. Each mirrors
//! the semantics of its production counterpart.

mod directories;
mod ledger_store;
mod notifier_and_auth;
mod payment_gateway;
mod payment_repository;
mod registration_repository;

pub use directories::{InMemoryEventDirectory, InMemoryUserDirectory};
pub use ledger_store::InMemoryLedgerStore;
pub use notifier_and_auth::{RecordedEmail, RecordingEmailNotifier, StaticTokenVerifier};
pub use payment_gateway::ScriptedPaymentGateway;
pub use payment_repository::InMemoryPaymentRepository;
pub use registration_repository::InMemoryRegistrationRepository;
