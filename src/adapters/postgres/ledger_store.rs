//! PostgreSQL implementation of LedgerStore.
//!
//! The transaction row and the denormalized balance on the user row are
//! written in one database transaction, so the log and the cache can never
//! disagree. Two constraints do the invariant work at the storage boundary:
//!
//! - a partial unique index on (user_id, event_id) for event_attendance
//!   rows rejects double claims
//! - the balance update carries `reward_points + delta >= 0` in its WHERE
//!   clause, so an overspend matches no row and rolls back

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, RegistrationId, Timestamp, TransactionId, UserId,
};
use crate::domain::rewards::{RewardBalance, RewardPointTransaction, RewardReason};
use crate::ports::LedgerStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the LedgerStore port.
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a ledger entry.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    delta: i64,
    reason: String,
    event_id: Option<Uuid>,
    registration_id: Option<Uuid>,
    reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for RewardPointTransaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(RewardPointTransaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            delta: row.delta,
            reason: parse_reason(&row.reason)?,
            event_id: row.event_id.map(EventId::from_uuid),
            registration_id: row.registration_id.map(RegistrationId::from_uuid),
            reference: row.reference,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_reason(s: &str) -> Result<RewardReason, DomainError> {
    match s {
        "event_attendance" => Ok(RewardReason::EventAttendance),
        "booking_spend" => Ok(RewardReason::BookingSpend),
        "admin_adjustment" => Ok(RewardReason::AdminAdjustment),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid reward reason value: {}", s),
        )),
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn append(
        &self,
        transaction: &RewardPointTransaction,
    ) -> Result<RewardBalance, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::database(format!("Failed to begin ledger transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO reward_point_transactions (
                id, user_id, delta, reason, event_id, registration_id,
                reference, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_uuid())
        .bind(transaction.delta)
        .bind(transaction.reason.as_str())
        .bind(transaction.event_id.map(|id| *id.as_uuid()))
        .bind(transaction.registration_id.map(|id| *id.as_uuid()))
        .bind(&transaction.reference)
        .bind(transaction.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("uq_attendance_claim_per_event") {
                    return DomainError::new(
                        ErrorCode::AlreadyClaimed,
                        "points already claimed for this event",
                    );
                }
            }
            DomainError::database(format!("Failed to append ledger entry: {}", e))
        })?;

        // Guarded balance update; matching zero rows means the precondition
        // failed and the insert above rolls back with us.
        let updated: Option<(i64, i64, i64)> = sqlx::query_as(
            r#"
            UPDATE users SET
                reward_points = reward_points + $2,
                total_points_earned = total_points_earned + GREATEST($2, 0),
                total_points_spent = total_points_spent + GREATEST(-$2, 0)
            WHERE id = $1 AND reward_points + $2 >= 0
            RETURNING reward_points, total_points_earned, total_points_spent
            "#,
        )
        .bind(transaction.user_id.as_uuid())
        .bind(transaction.delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update balance: {}", e)))?;

        let Some((points, earned, spent)) = updated else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(transaction.user_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        DomainError::database(format!("Failed to check user existence: {}", e))
                    })?;
            return Err(if exists {
                DomainError::new(
                    ErrorCode::InsufficientBalance,
                    format!(
                        "cannot spend {} points, balance too low",
                        -transaction.delta
                    ),
                )
            } else {
                DomainError::new(
                    ErrorCode::UserNotFound,
                    format!("user {} not found", transaction.user_id),
                )
            });
        };

        tx.commit().await.map_err(|e| {
            DomainError::database(format!("Failed to commit ledger transaction: {}", e))
        })?;

        RewardBalance::from_totals(earned, spent, points)
    }

    async fn balance_of(&self, user_id: &UserId) -> Result<RewardBalance, DomainError> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT reward_points, total_points_earned, total_points_spent FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to read balance: {}", e)))?;

        match row {
            Some((points, earned, spent)) => RewardBalance::from_totals(earned, spent, points),
            None => Ok(RewardBalance::zero()),
        }
    }

    async fn transactions_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RewardPointTransaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT * FROM reward_point_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list ledger entries: {}", e)))?;
        rows.into_iter()
            .map(RewardPointTransaction::try_from)
            .collect()
    }

    async fn has_claim_for_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reward_point_transactions
                WHERE user_id = $1 AND event_id = $2 AND reason = 'event_attendance'
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check claim: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_round_trips_through_storage_form() {
        for reason in [
            RewardReason::EventAttendance,
            RewardReason::BookingSpend,
            RewardReason::AdminAdjustment,
        ] {
            assert_eq!(parse_reason(reason.as_str()).unwrap(), reason);
        }
    }

    #[test]
    fn unknown_reason_is_a_database_error() {
        assert_eq!(
            parse_reason("loyalty_bonus").unwrap_err().code,
            ErrorCode::DatabaseError
        );
    }
}
