//! PostgreSQL implementation of PaymentRepository.

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, RegistrationId, Timestamp};
use crate::domain::payment::{Payment, PaymentPurpose, PaymentStatus};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new repository backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    external_reference: String,
    status: String,
    amount_cents: i64,
    currency: String,
    purpose: String,
    registration_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            external_reference: row.external_reference,
            status: parse_status(&row.status)?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            purpose: parse_purpose(&row.purpose)?,
            registration_id: row.registration_id.map(RegistrationId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s {
        "created" => Ok(PaymentStatus::Created),
        "paid" => Ok(PaymentStatus::Paid),
        "failed" => Ok(PaymentStatus::Failed),
        "refunded" => Ok(PaymentStatus::Refunded),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Created => "created",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Refunded => "refunded",
    }
}

fn parse_purpose(s: &str) -> Result<PaymentPurpose, DomainError> {
    match s {
        "play_booking" => Ok(PaymentPurpose::PlayBooking),
        "guest_addon" => Ok(PaymentPurpose::GuestAddon),
        "waitlist" => Ok(PaymentPurpose::Waitlist),
        "shop_order" => Ok(PaymentPurpose::ShopOrder),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment purpose value: {}", s),
        )),
    }
}

fn purpose_to_string(purpose: &PaymentPurpose) -> &'static str {
    match purpose {
        PaymentPurpose::PlayBooking => "play_booking",
        PaymentPurpose::GuestAddon => "guest_addon",
        PaymentPurpose::Waitlist => "waitlist",
        PaymentPurpose::ShopOrder => "shop_order",
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, external_reference, status, amount_cents, currency,
                purpose, registration_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(&payment.external_reference)
        .bind(status_to_string(&payment.status))
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(purpose_to_string(&payment.purpose))
        .bind(payment.registration_id.map(|id| *id.as_uuid()))
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payments_external_reference_key") {
                    return DomainError::validation(
                        "external_reference",
                        "payment with this reference already exists",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save payment: {}", e),
            )
        })?;
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                amount_cents = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(status_to_string(&payment.status))
        .bind(payment.amount_cents)
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update payment: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("payment {} not found", payment.id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as("SELECT * FROM payments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to find payment: {}", e),
                )
            })?;
        row.map(Payment::try_from).transpose()
    }

    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as("SELECT * FROM payments WHERE external_reference = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find payment by reference: {}", e),
                    )
                })?;
        row.map(Payment::try_from).transpose()
    }

    async fn find_paid_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            "SELECT * FROM payments WHERE registration_id = $1 AND status = 'paid'",
        )
        .bind(registration_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find paid payment: {}", e),
            )
        })?;
        row.map(Payment::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            PaymentStatus::Created,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(parse_status(status_to_string(&status)).unwrap(), status);
        }
    }

    #[test]
    fn purpose_round_trips_through_storage_form() {
        for purpose in [
            PaymentPurpose::PlayBooking,
            PaymentPurpose::GuestAddon,
            PaymentPurpose::Waitlist,
            PaymentPurpose::ShopOrder,
        ] {
            assert_eq!(parse_purpose(purpose_to_string(&purpose)).unwrap(), purpose);
        }
    }

    #[test]
    fn unknown_purpose_is_a_database_error() {
        assert_eq!(
            parse_purpose("lottery").unwrap_err().code,
            ErrorCode::DatabaseError
        );
    }
}
