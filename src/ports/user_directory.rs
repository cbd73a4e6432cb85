//! User directory port.
//!
//! Read-only lookup of member profiles, used to resolve email addresses
//! when sending booking notifications. Account management itself is out of
//! scope for this service.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A member profile as the booking flow sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier.
    pub id: UserId,

    /// Email address for transactional notifications.
    pub email: String,

    /// Display name, if the member has set one.
    pub display_name: Option<String>,
}

/// Read port for member profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a profile by user ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError>;
}
