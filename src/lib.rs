//! Slotbook - Club event booking and reward backend
//!
//! This crate implements registrations with capacity control and waitlists,
//! gateway-settled payments, an append-only reward point ledger, and the
//! reconciliation sweeps that keep the three consistent.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
