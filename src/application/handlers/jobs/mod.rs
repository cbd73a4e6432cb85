//! Reconciliation sweep handlers, triggered by an external scheduler.

pub mod expire_pending_sweep;
pub mod refund_sweep;
pub mod sweep_report;

pub use expire_pending_sweep::ExpirePendingSweepHandler;
pub use refund_sweep::RefundSweepHandler;
pub use sweep_report::{ExpireSweepReport, RefundSweepReport, SweepItemError};
