//! RefundSweepHandler - returns money owed for cancelled and expired
//! bookings.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::registration::RegistrationStatus;
use crate::ports::{
    EmailNotifier, EventDirectory, PaymentGateway, PaymentRepository, RegistrationRepository,
    UserDirectory,
};

use super::sweep_report::{RefundSweepReport, SweepItemError};

/// Handler for the refund sweep.
///
/// Cancellation refunds are deliberately deferred: a cancelled booking is
/// only refunded after its event's date has passed, which leaves admins
/// free to adjust registrations right up to event time. An expired
/// registration whose payment settled after the slot was released owes the
/// member their money with no admin discretion involved, so those are
/// refunded as soon as the sweep sees them.
///
/// The gateway call comes first; only a successful refund moves the
/// Payment and Registration to `refunded`. A gateway failure leaves both
/// untouched so the next sweep retries.
pub struct RefundSweepHandler {
    registrations: Arc<dyn RegistrationRepository>,
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn EventDirectory>,
    gateway: Arc<dyn PaymentGateway>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn EmailNotifier>,
}

impl RefundSweepHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn EventDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            registrations,
            payments,
            events,
            gateway,
            users,
            notifier,
        }
    }

    pub async fn handle(&self) -> Result<RefundSweepReport, DomainError> {
        let now = Timestamp::now();
        let candidates = self.registrations.find_refund_candidates().await?;

        let mut report = RefundSweepReport::default();
        report.scanned = candidates.len() as u32;

        for mut registration in candidates {
            let event = match self.events.find_by_id(&registration.event_id).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    report.errors.push(SweepItemError::new(
                        registration.id,
                        format!("event {} not found", registration.event_id),
                    ));
                    continue;
                }
                Err(err) => {
                    report
                        .errors
                        .push(SweepItemError::new(registration.id, err.to_string()));
                    continue;
                }
            };

            // Deferred-refund policy for cancellations: never before the
            // event date. Expired-but-paid refunds immediately.
            if registration.status == RegistrationStatus::Cancelled && !event.has_finished(now) {
                report.skipped_future_event += 1;
                continue;
            }

            let payment = match self.payments.find_paid_for_registration(&registration.id).await
            {
                Ok(Some(payment)) => payment,
                Ok(None) => {
                    // A gateway reference without a settled payment; the
                    // late-success webhook may still be on its way
                    report.skipped_no_payment += 1;
                    continue;
                }
                Err(err) => {
                    report
                        .errors
                        .push(SweepItemError::new(registration.id, err.to_string()));
                    continue;
                }
            };

            if let Err(err) = self.gateway.issue_refund(&payment.external_reference).await {
                tracing::warn!(
                    registration_id = %registration.id,
                    payment_reference = %payment.external_reference,
                    error = %err,
                    "refund failed; will retry next sweep"
                );
                report
                    .errors
                    .push(SweepItemError::new(registration.id, err.to_string()));
                continue;
            }

            let mut payment = payment;
            if let Err(err) = self.apply_refund(&mut registration, &mut payment).await {
                report
                    .errors
                    .push(SweepItemError::new(registration.id, err.to_string()));
                continue;
            }
            report.refunded += 1;

            tracing::info!(
                registration_id = %registration.id,
                amount_cents = payment.amount_cents,
                "refund issued"
            );

            self.notify_refunded(&registration, payment.amount_cents).await;
        }

        Ok(report)
    }

    async fn apply_refund(
        &self,
        registration: &mut crate::domain::registration::Registration,
        payment: &mut crate::domain::payment::Payment,
    ) -> Result<(), DomainError> {
        payment.mark_refunded()?;
        self.payments.update(payment).await?;
        registration.refund()?;
        self.registrations.update(registration).await?;
        Ok(())
    }

    async fn notify_refunded(
        &self,
        registration: &crate::domain::registration::Registration,
        amount_cents: i64,
    ) {
        let profile = match self.users.find_by_id(&registration.user_id).await {
            Ok(Some(profile)) => profile,
            _ => return,
        };
        if let Err(err) = self
            .notifier
            .refund_issued(&profile.email, registration, amount_cents)
            .await
        {
            tracing::warn!(
                user_id = %registration.user_id,
                error = %err,
                "failed to send refund email"
            );
        }
    }
}
