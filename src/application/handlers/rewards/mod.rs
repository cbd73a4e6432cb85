//! Reward engine handlers: claims, spends and account projections.

pub mod claim_points;
pub mod reward_queries;
pub mod spend_points;

pub use claim_points::{ClaimPointsCommand, ClaimPointsHandler, ClaimPointsResult};
pub use reward_queries::{
    GetRewardAccountHandler, GetUnclaimedPointsHandler, RewardAccount, UnclaimedPoints,
};
pub use spend_points::{SpendPointsCommand, SpendPointsHandler, SpendPointsResult};
