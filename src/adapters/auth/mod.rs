//! Token verification adapters.

pub mod jwt_verifier;

pub use jwt_verifier::JwtVerifier;
