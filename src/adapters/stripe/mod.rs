//! Stripe adapter for the payment gateway port.

pub mod stripe_gateway;

pub use stripe_gateway::{StripeConfig, StripeGateway};
