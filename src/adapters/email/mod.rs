//! Email notifier adapters.

pub mod resend_notifier;

pub use resend_notifier::{ResendConfig, ResendNotifier};
