//! Request and response types for reward endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::rewards::{
    ClaimPointsResult, RewardAccount, SpendPointsResult, UnclaimedPoints,
};
use crate::domain::foundation::Timestamp;
use crate::domain::rewards::{RewardPointTransaction, RewardReason};

/// Request body for `POST /rewards/claim`.
#[derive(Debug, Deserialize)]
pub struct ClaimPointsRequest {
    pub event_id: Uuid,
}

/// Request body for `POST /rewards/spend`.
#[derive(Debug, Deserialize)]
pub struct SpendPointsRequest {
    pub points: i64,
    /// Booking the discount applies to.
    pub booking_ref: String,
}

/// A ledger entry as exposed over the API.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub delta: i64,
    pub reason: RewardReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub created_at: Timestamp,
}

impl From<RewardPointTransaction> for TransactionResponse {
    fn from(tx: RewardPointTransaction) -> Self {
        Self {
            id: *tx.id.as_uuid(),
            delta: tx.delta,
            reason: tx.reason,
            event_id: tx.event_id.map(|id| *id.as_uuid()),
            reference: tx.reference,
            created_at: tx.created_at,
        }
    }
}

/// Response for `GET /rewards`.
#[derive(Debug, Serialize)]
pub struct RewardAccountResponse {
    pub reward_points: i64,
    pub total_points_earned: i64,
    pub total_points_spent: i64,
    pub transactions: Vec<TransactionResponse>,
}

impl From<RewardAccount> for RewardAccountResponse {
    fn from(account: RewardAccount) -> Self {
        Self {
            reward_points: account.balance.reward_points,
            total_points_earned: account.balance.total_points_earned,
            total_points_spent: account.balance.total_points_spent,
            transactions: account
                .transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
        }
    }
}

/// Response for `GET /rewards/unclaimed`.
#[derive(Debug, Serialize)]
pub struct UnclaimedPointsResponse {
    pub count: u32,
    pub points: i64,
}

impl From<UnclaimedPoints> for UnclaimedPointsResponse {
    fn from(unclaimed: UnclaimedPoints) -> Self {
        Self {
            count: unclaimed.count,
            points: unclaimed.points,
        }
    }
}

/// Response for `POST /rewards/claim`.
#[derive(Debug, Serialize)]
pub struct ClaimPointsResponse {
    pub points_credited: i64,
    pub reward_points: i64,
}

impl From<ClaimPointsResult> for ClaimPointsResponse {
    fn from(result: ClaimPointsResult) -> Self {
        Self {
            points_credited: result.points_credited,
            reward_points: result.balance.reward_points,
        }
    }
}

/// Response for `POST /rewards/spend`.
#[derive(Debug, Serialize)]
pub struct SpendPointsResponse {
    pub points_spent: i64,
    pub reward_points: i64,
}

impl From<SpendPointsResult> for SpendPointsResponse {
    fn from(result: SpendPointsResult) -> Self {
        Self {
            points_spent: result.points_spent,
            reward_points: result.balance.reward_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, RegistrationId, UserId};

    #[test]
    fn transaction_response_serializes_reason_snake_case() {
        let tx = RewardPointTransaction::attendance_credit(
            UserId::new(),
            EventId::new(),
            RegistrationId::new(),
            40,
        );

        let json = serde_json::to_value(TransactionResponse::from(tx)).expect("serializes");
        assert_eq!(json["reason"], "event_attendance");
        assert_eq!(json["delta"], 40);
        assert!(json.get("reference").is_none());
    }
}
