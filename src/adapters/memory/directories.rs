//! In-memory event and user directories.

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, EventId, UserId};
use crate::ports::{EventDirectory, UserDirectory, UserProfile};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mutex-backed event directory for tests and local development.
#[derive(Default)]
pub struct InMemoryEventDirectory {
    events: Mutex<Vec<PlayEvent>>,
}

impl InMemoryEventDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(event: PlayEvent) -> Self {
        Self {
            events: Mutex::new(vec![event]),
        }
    }

    pub fn add_event(&self, event: PlayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl EventDirectory for InMemoryEventDirectory {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<PlayEvent>, DomainError> {
        let events = self.events.lock().unwrap();
        Ok(events.iter().find(|e| &e.id == id).cloned())
    }
}

/// Mutex-backed user directory for tests and local development.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: UserProfile) -> Self {
        Self {
            users: Mutex::new(vec![user]),
        }
    }

    pub fn add_user(&self, user: UserProfile) {
        self.users.lock().unwrap().push(user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }
}
