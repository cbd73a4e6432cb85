//! Shared application state for the HTTP surface.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::application::handlers::booking::{
    CancelRegistrationHandler, CheckoutUrls, CreateBookingHandler, GetBookingHandler,
    ListEventRegistrationsHandler, ListUserBookingsHandler, UpdateRegistrationStatusHandler,
    WaitlistPromotion,
};
use crate::application::handlers::jobs::{ExpirePendingSweepHandler, RefundSweepHandler};
use crate::application::handlers::payment::HandleGatewayWebhookHandler;
use crate::application::handlers::rewards::{
    ClaimPointsHandler, GetRewardAccountHandler, GetUnclaimedPointsHandler, SpendPointsHandler,
};
use crate::domain::payment::WebhookVerifier;
use crate::ports::{
    EmailNotifier, EventDirectory, LedgerStore, PaymentGateway, PaymentRepository,
    RegistrationRepository, TokenVerifier, UserDirectory,
};

/// Shared application state containing all dependencies.
///
/// Cloned per request; everything inside is Arc-wrapped or cheap to clone.
/// Application handlers are built on demand from the shared ports.
#[derive(Clone)]
pub struct AppState {
    pub registrations: Arc<dyn RegistrationRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub ledger: Arc<dyn LedgerStore>,
    pub events: Arc<dyn EventDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn EmailNotifier>,
    pub token_verifier: Arc<dyn TokenVerifier>,

    /// Webhook signing secret for the payment gateway.
    pub webhook_secret: SecretString,

    /// Shared secret the job scheduler presents.
    pub jobs_trigger_secret: SecretString,

    /// Redirect URLs for hosted checkout.
    pub checkout_urls: CheckoutUrls,

    /// Payment window for pending registrations, in minutes.
    pub payment_timeout_minutes: u32,
}

impl AppState {
    fn waitlist_promotion(&self) -> Arc<WaitlistPromotion> {
        Arc::new(WaitlistPromotion::new(
            self.registrations.clone(),
            self.payments.clone(),
            self.gateway.clone(),
            self.users.clone(),
            self.notifier.clone(),
            self.checkout_urls.clone(),
            self.payment_timeout_minutes,
        ))
    }

    pub fn create_booking_handler(&self) -> CreateBookingHandler {
        CreateBookingHandler::new(
            self.registrations.clone(),
            self.payments.clone(),
            self.events.clone(),
            self.gateway.clone(),
            self.checkout_urls.clone(),
            self.payment_timeout_minutes,
        )
    }

    pub fn cancel_registration_handler(&self) -> CancelRegistrationHandler {
        CancelRegistrationHandler::new(
            self.registrations.clone(),
            self.events.clone(),
            self.waitlist_promotion(),
        )
    }

    pub fn list_user_bookings_handler(&self) -> ListUserBookingsHandler {
        ListUserBookingsHandler::new(self.registrations.clone())
    }

    pub fn get_booking_handler(&self) -> GetBookingHandler {
        GetBookingHandler::new(self.registrations.clone())
    }

    pub fn list_event_registrations_handler(&self) -> ListEventRegistrationsHandler {
        ListEventRegistrationsHandler::new(self.registrations.clone())
    }

    pub fn update_registration_status_handler(&self) -> UpdateRegistrationStatusHandler {
        UpdateRegistrationStatusHandler::new(
            self.registrations.clone(),
            self.events.clone(),
            self.waitlist_promotion(),
        )
    }

    pub fn claim_points_handler(&self) -> ClaimPointsHandler {
        ClaimPointsHandler::new(
            self.registrations.clone(),
            self.events.clone(),
            self.ledger.clone(),
        )
    }

    pub fn spend_points_handler(&self) -> SpendPointsHandler {
        SpendPointsHandler::new(self.ledger.clone())
    }

    pub fn reward_account_handler(&self) -> GetRewardAccountHandler {
        GetRewardAccountHandler::new(self.ledger.clone())
    }

    pub fn unclaimed_points_handler(&self) -> GetUnclaimedPointsHandler {
        GetUnclaimedPointsHandler::new(
            self.registrations.clone(),
            self.events.clone(),
            self.ledger.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            WebhookVerifier::new(self.webhook_secret.expose_secret()),
            self.payments.clone(),
            self.registrations.clone(),
            self.events.clone(),
            self.users.clone(),
            self.notifier.clone(),
        )
    }

    pub fn expire_pending_sweep_handler(&self) -> ExpirePendingSweepHandler {
        ExpirePendingSweepHandler::new(
            self.registrations.clone(),
            self.payments.clone(),
            self.events.clone(),
            self.waitlist_promotion(),
        )
    }

    pub fn refund_sweep_handler(&self) -> RefundSweepHandler {
        RefundSweepHandler::new(
            self.registrations.clone(),
            self.payments.clone(),
            self.events.clone(),
            self.gateway.clone(),
            self.users.clone(),
            self.notifier.clone(),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEventDirectory, InMemoryLedgerStore, InMemoryPaymentRepository,
        InMemoryRegistrationRepository, InMemoryUserDirectory, RecordingEmailNotifier,
        ScriptedPaymentGateway, StaticTokenVerifier,
    };

    /// State wired entirely against in-memory adapters.
    pub fn memory_state() -> AppState {
        AppState {
            registrations: Arc::new(InMemoryRegistrationRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            ledger: Arc::new(InMemoryLedgerStore::new()),
            events: Arc::new(InMemoryEventDirectory::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
            gateway: Arc::new(ScriptedPaymentGateway::new()),
            notifier: Arc::new(RecordingEmailNotifier::new()),
            token_verifier: Arc::new(StaticTokenVerifier::new()),
            webhook_secret: SecretString::new("whsec_test_secret".to_string()),
            jobs_trigger_secret: SecretString::new("scheduler-trigger-secret".to_string()),
            checkout_urls: CheckoutUrls {
                success_url: "https://club.example/booking/success".to_string(),
                cancel_url: "https://club.example/booking/cancelled".to_string(),
            },
            payment_timeout_minutes: 30,
        }
    }
}
