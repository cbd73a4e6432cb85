//! Token verifier port.
//!
//! Validates bearer tokens on incoming requests and extracts the caller's
//! identity and role. Kept as a port so handlers and middleware can be
//! tested with a mock instead of minting real tokens.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Caller identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// The authenticated user.
    pub user_id: UserId,

    /// Role granted by the token.
    pub role: UserRole,
}

impl AuthClaims {
    /// Whether the caller may use the admin surface.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Roles recognized by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Admin,
}

/// Port for bearer-token verification.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and return the caller's claims.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is missing required claims, expired,
    ///   or fails signature verification
    async fn verify(&self, token: &str) -> Result<AuthClaims, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn token_verifier_is_object_safe() {
        fn _accepts_dyn(_verifier: &dyn TokenVerifier) {}
    }

    #[test]
    fn admin_check_follows_role() {
        let member = AuthClaims {
            user_id: UserId::new(),
            role: UserRole::Member,
        };
        let admin = AuthClaims {
            user_id: UserId::new(),
            role: UserRole::Admin,
        };

        assert!(!member.is_admin());
        assert!(admin.is_admin());
    }
}
