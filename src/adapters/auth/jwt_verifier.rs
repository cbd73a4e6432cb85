//! JWT bearer-token verifier.
//!
//! Verifies HS256-signed JWTs issued by the club's identity service.
//! Expected claims: `sub` (user UUID), `role` ("member" or "admin"),
//! `exp` (enforced by `jsonwebtoken`).

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{AuthClaims, TokenVerifier, UserRole};

/// Token verifier backed by a shared HS256 signing secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    sub: String,
    role: String,
    #[allow(dead_code)]
    exp: i64,
}

impl JwtVerifier {
    /// Create a verifier for tokens signed with the given secret.
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthClaims, DomainError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT verification failed");
                DomainError::unauthorized("Invalid or expired token")
            })?;

        let user_uuid = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| DomainError::unauthorized("Token subject is not a valid user id"))?;

        let role = match data.claims.role.as_str() {
            "admin" => UserRole::Admin,
            "member" => UserRole::Member,
            other => {
                tracing::warn!(role = other, "Token carries unknown role");
                return Err(DomainError::unauthorized("Unknown role in token"));
            }
        };

        Ok(AuthClaims {
            user_id: UserId::from_uuid(user_uuid),
            role,
        })
    }
}
