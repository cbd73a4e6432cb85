//! Per-item outcome reporting for reconciliation sweeps.
//!
//! Sweeps are best-effort batches: one stuck registration must not abort
//! the rest, so failures are captured per item and reported rather than
//! propagated.

use serde::Serialize;

/// A single item the sweep could not process.
#[derive(Debug, Clone, Serialize)]
pub struct SweepItemError {
    pub registration_id: String,
    pub message: String,
}

impl SweepItemError {
    pub fn new(registration_id: impl ToString, message: impl Into<String>) -> Self {
        Self {
            registration_id: registration_id.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of one expiry sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpireSweepReport {
    /// Pending registrations past their payment window.
    pub scanned: u32,
    /// Registrations transitioned to `expired`.
    pub expired: u32,
    /// Waitlist entries promoted into freed slots.
    pub promoted: u32,
    /// Registrations left alone because a settled payment was found (the
    /// confirm webhook is racing the sweep).
    pub skipped_paid: u32,
    /// Items that errored; retried on the next run.
    pub errors: Vec<SweepItemError>,
}

/// Outcome of one refund sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundSweepReport {
    /// Refund candidates considered (cancelled or expired, with a
    /// recorded payment).
    pub scanned: u32,
    /// Refunds issued and recorded.
    pub refunded: u32,
    /// Cancellations skipped because the event has not happened yet
    /// (those refunds are deferred until after the event).
    pub skipped_future_event: u32,
    /// Skipped because the payment never settled; nothing to return yet.
    pub skipped_no_payment: u32,
    /// Items that errored; retried on the next run.
    pub errors: Vec<SweepItemError>,
}
