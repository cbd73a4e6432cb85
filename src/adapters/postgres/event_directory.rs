//! PostgreSQL implementation of EventDirectory.

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, EventId, Timestamp};
use crate::ports::EventDirectory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the EventDirectory port.
pub struct PostgresEventDirectory {
    pool: PgPool,
}

impl PostgresEventDirectory {
    /// Creates a new directory backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    capacity: i32,
    price_cents: i64,
    currency: String,
    scheduled_at: DateTime<Utc>,
    reward_points: i64,
}

impl From<EventRow> for PlayEvent {
    fn from(row: EventRow) -> Self {
        PlayEvent {
            id: EventId::from_uuid(row.id),
            name: row.name,
            capacity: row.capacity as u32,
            price_cents: row.price_cents,
            currency: row.currency,
            scheduled_at: Timestamp::from_datetime(row.scheduled_at),
            reward_points: row.reward_points,
        }
    }
}

#[async_trait]
impl EventDirectory for PostgresEventDirectory {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<PlayEvent>, DomainError> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, capacity, price_cents, currency, scheduled_at, reward_points
            FROM events WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find event: {}", e)))?;
        Ok(row.map(PlayEvent::from))
    }
}
