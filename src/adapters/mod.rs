//! Adapter implementations of the ports.
//!
//! Outbound adapters (postgres, stripe, email, auth) implement the ports the
//! application layer depends on; the http module is the inbound surface. The
//! memory module holds in-memory implementations used by tests.

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
