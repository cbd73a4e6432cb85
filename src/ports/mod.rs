//! Ports: the contracts between application handlers and the outside world.
//!
//! Handlers depend on these traits; adapters implement them. Everything here
//! is object-safe so handlers can hold `Arc<dyn Port>`.

mod email_notifier;
mod event_directory;
mod ledger_store;
mod payment_gateway;
mod payment_repository;
mod registration_repository;
mod token_verifier;
mod user_directory;

pub use email_notifier::EmailNotifier;
pub use event_directory::EventDirectory;
pub use ledger_store::LedgerStore;
pub use payment_gateway::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, GatewayErrorCode, PaymentGateway, Refund,
};
pub use payment_repository::PaymentRepository;
pub use registration_repository::RegistrationRepository;
pub use token_verifier::{AuthClaims, TokenVerifier, UserRole};
pub use user_directory::{UserDirectory, UserProfile};
