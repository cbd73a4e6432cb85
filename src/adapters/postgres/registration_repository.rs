//! PostgreSQL implementation of RegistrationRepository.
//!
//! Capacity-sensitive inserts run inside a transaction that takes the
//! event's row lock first, serializing concurrent bookings for the same
//! event. Two requests racing for the last slot therefore see each other's
//! writes; only one succeeds.

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, RegistrationId, Timestamp, UserId,
};
use crate::domain::registration::{Registration, RegistrationStatus};
use crate::ports::RegistrationRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the RegistrationRepository port.
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    /// Creates a new repository backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a registration.
#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    status: String,
    guest_count: i32,
    amount_paid_cents: i64,
    payment_reference: Option<String>,
    waitlist_position: Option<i32>,
    payment_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = DomainError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(Registration {
            id: RegistrationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            event_id: EventId::from_uuid(row.event_id),
            status: parse_status(&row.status)?,
            guest_count: row.guest_count as u32,
            amount_paid_cents: row.amount_paid_cents,
            payment_reference: row.payment_reference,
            waitlist_position: row.waitlist_position.map(|p| p as u32),
            payment_expires_at: row.payment_expires_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
        })
    }
}

fn parse_status(s: &str) -> Result<RegistrationStatus, DomainError> {
    match s {
        "pending_payment" => Ok(RegistrationStatus::PendingPayment),
        "waitlisted" => Ok(RegistrationStatus::Waitlisted),
        "confirmed" => Ok(RegistrationStatus::Confirmed),
        "cancelled" => Ok(RegistrationStatus::Cancelled),
        "expired" => Ok(RegistrationStatus::Expired),
        "refunded" => Ok(RegistrationStatus::Refunded),
        "completed" => Ok(RegistrationStatus::Completed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid registration status value: {}", s),
        )),
    }
}

fn status_to_string(status: &RegistrationStatus) -> &'static str {
    match status {
        RegistrationStatus::PendingPayment => "pending_payment",
        RegistrationStatus::Waitlisted => "waitlisted",
        RegistrationStatus::Confirmed => "confirmed",
        RegistrationStatus::Cancelled => "cancelled",
        RegistrationStatus::Expired => "expired",
        RegistrationStatus::Refunded => "refunded",
        RegistrationStatus::Completed => "completed",
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("{}: {}", context, e),
    )
}

const ACTIVE_STATUSES: [&str; 3] = ["pending_payment", "waitlisted", "confirmed"];
const SLOT_HOLDING_STATUSES: [&str; 2] = ["pending_payment", "confirmed"];

const INSERT_SQL: &str = r#"
    INSERT INTO registrations (
        id, user_id, event_id, status, guest_count, amount_paid_cents,
        payment_reference, waitlist_position, payment_expires_at,
        created_at, updated_at, cancelled_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
"#;

fn bind_insert<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    registration: &'q Registration,
    waitlist_position: Option<i32>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(registration.id.as_uuid())
        .bind(registration.user_id.as_uuid())
        .bind(registration.event_id.as_uuid())
        .bind(status_to_string(&registration.status))
        .bind(registration.guest_count as i32)
        .bind(registration.amount_paid_cents)
        .bind(&registration.payment_reference)
        .bind(waitlist_position)
        .bind(registration.payment_expires_at.map(|t| *t.as_datetime()))
        .bind(registration.created_at.as_datetime())
        .bind(registration.updated_at.as_datetime())
        .bind(registration.cancelled_at.map(|t| *t.as_datetime()))
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn insert_pending_if_capacity(
        &self,
        registration: &Registration,
        max_capacity: u32,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Lock the event row; all capacity decisions for this event queue
        // behind this lock.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(registration.event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock event row", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::EventNotFound,
                    format!("event {} not found", registration.event_id),
                )
            })?;

        let has_active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM registrations
                WHERE user_id = $1 AND event_id = $2 AND status = ANY($3)
            )
            "#,
        )
        .bind(registration.user_id.as_uuid())
        .bind(registration.event_id.as_uuid())
        .bind(&ACTIVE_STATUSES[..])
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to check for active registration", e))?;

        if has_active {
            return Err(DomainError::new(
                ErrorCode::DuplicateRegistration,
                "user already has an active registration for this event",
            ));
        }

        let used: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(guest_count + 1), 0) FROM registrations
            WHERE event_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(registration.event_id.as_uuid())
        .bind(&SLOT_HOLDING_STATUSES[..])
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to count used capacity", e))?;

        if used + registration.party_size() as i64 > max_capacity as i64 {
            // Dropping the transaction rolls back and releases the lock
            return Ok(false);
        }

        bind_insert(sqlx::query(INSERT_SQL), registration, None)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert registration", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit registration insert", e))?;
        Ok(true)
    }

    async fn insert_waitlisted(&self, registration: &Registration) -> Result<u32, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Positions are assigned under the event lock so concurrent joins
        // cannot collide.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(registration.event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock event row", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::EventNotFound,
                    format!("event {} not found", registration.event_id),
                )
            })?;

        let has_active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM registrations
                WHERE user_id = $1 AND event_id = $2 AND status = ANY($3)
            )
            "#,
        )
        .bind(registration.user_id.as_uuid())
        .bind(registration.event_id.as_uuid())
        .bind(&ACTIVE_STATUSES[..])
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to check for active registration", e))?;

        if has_active {
            return Err(DomainError::new(
                ErrorCode::DuplicateRegistration,
                "user already has an active registration for this event",
            ));
        }

        let position: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(waitlist_position), 0) + 1 FROM registrations
            WHERE event_id = $1 AND status = 'waitlisted'
            "#,
        )
        .bind(registration.event_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to compute waitlist position", e))?;

        bind_insert(sqlx::query(INSERT_SQL), registration, Some(position))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert waitlist entry", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit waitlist insert", e))?;
        Ok(position as u32)
    }

    async fn update(&self, registration: &Registration) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE registrations SET
                status = $2,
                guest_count = $3,
                amount_paid_cents = $4,
                payment_reference = $5,
                waitlist_position = $6,
                payment_expires_at = $7,
                updated_at = $8,
                cancelled_at = $9
            WHERE id = $1
            "#,
        )
        .bind(registration.id.as_uuid())
        .bind(status_to_string(&registration.status))
        .bind(registration.guest_count as i32)
        .bind(registration.amount_paid_cents)
        .bind(&registration.payment_reference)
        .bind(registration.waitlist_position.map(|p| p as i32))
        .bind(registration.payment_expires_at.map(|t| *t.as_datetime()))
        .bind(registration.updated_at.as_datetime())
        .bind(registration.cancelled_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update registration", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                format!("registration {} not found", registration.id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        let row: Option<RegistrationRow> =
            sqlx::query_as("SELECT * FROM registrations WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find registration", e))?;
        row.map(Registration::try_from).transpose()
    }

    async fn find_active_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE user_id = $1 AND event_id = $2 AND status = ANY($3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .bind(&ACTIVE_STATUSES[..])
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find active registration", e))?;
        row.map(Registration::try_from).transpose()
    }

    async fn find_completed_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE user_id = $1 AND event_id = $2 AND status = 'completed'
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find completed registration", e))?;
        row.map(Registration::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            "SELECT * FROM registrations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list registrations", e))?;
        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, DomainError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1
            ORDER BY waitlist_position NULLS FIRST, created_at
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list event registrations", e))?;
        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn find_pending_expired(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Registration>, DomainError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE status = 'pending_payment' AND payment_expires_at <= $1
            ORDER BY payment_expires_at
            "#,
        )
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find expired registrations", e))?;
        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn find_first_waitlisted(
        &self,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1 AND status = 'waitlisted'
            ORDER BY waitlist_position
            LIMIT 1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find waitlist head", e))?;
        row.map(Registration::try_from).transpose()
    }

    async fn promote_head_if_capacity(
        &self,
        registration_id: &RegistrationId,
        event_id: &EventId,
        max_capacity: u32,
        payment_expires_at: Timestamp,
        payment_reference: &str,
    ) -> Result<Option<Registration>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Same lock as the capacity insert, so promotions and bookings for
        // one event serialize against each other.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock event row", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::EventNotFound,
                    format!("event {} not found", event_id),
                )
            })?;

        let head: Option<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT * FROM registrations
            WHERE event_id = $1 AND status = 'waitlisted'
            ORDER BY waitlist_position
            LIMIT 1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to re-read waitlist head", e))?;

        let head = match head {
            Some(row) if &row.id == registration_id.as_uuid() => Registration::try_from(row)?,
            // Promoted or cancelled by a concurrent slot release
            _ => return Ok(None),
        };

        let used: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(guest_count + 1), 0) FROM registrations
            WHERE event_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(&SLOT_HOLDING_STATUSES[..])
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to count used capacity", e))?;

        if used + head.party_size() as i64 > max_capacity as i64 {
            return Ok(None);
        }

        let mut head = head;
        head.promote(payment_expires_at)?;
        head.set_payment_reference(payment_reference);

        sqlx::query(
            r#"
            UPDATE registrations SET
                status = $2,
                payment_reference = $3,
                waitlist_position = NULL,
                payment_expires_at = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(head.id.as_uuid())
        .bind(status_to_string(&head.status))
        .bind(&head.payment_reference)
        .bind(head.payment_expires_at.map(|t| *t.as_datetime()))
        .bind(head.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to promote waitlist head", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit waitlist promotion", e))?;
        Ok(Some(head))
    }

    async fn find_refund_candidates(&self) -> Result<Vec<Registration>, DomainError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT r.* FROM registrations r
            WHERE r.status IN ('cancelled', 'expired')
              AND EXISTS (
                  SELECT 1 FROM payments p
                  WHERE p.registration_id = r.id AND p.status = 'paid'
              )
            ORDER BY r.updated_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find refund candidates", e))?;
        rows.into_iter().map(Registration::try_from).collect()
    }
}
