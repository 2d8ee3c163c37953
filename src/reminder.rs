//! Pre-notification reminder scheduling.
//!
//! Periodic job scanning due dates whose reminder is owed and overdue.
//! Delivery is best effort: each row is sent and flipped individually, so a
//! crash mid-run can re-send or postpone a reminder but never lose the debit
//! itself. Reminders are informational only.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::{DebitError, DueDate, Payment, PaymentId};
use crate::export::PaymentRepository;

/// Outgoing-mail seam; the host renders and delivers the actual message.
pub trait ReminderMailer {
    fn send(&mut self, payment: &Payment, due: &DueDate) -> Result<(), DebitError>;
}

/// Result of one reminder tick.
#[derive(Debug, Clone, Default)]
pub struct ReminderOutcome {
    pub sent: Vec<PaymentId>,
    /// Payments whose reminder failed to send; left outstanding for the
    /// next tick.
    pub failed: Vec<PaymentId>,
}

/// Send all due pre-notification reminders and mark them provided.
///
/// A row is picked up once `now` has passed its `remind_after` threshold and
/// the owning payment is still confirmed. The state flip happens only after
/// a successful send.
pub fn send_due_reminders<R, M>(
    repo: &mut R,
    mailer: &mut M,
    now: DateTime<Utc>,
) -> Result<ReminderOutcome, DebitError>
where
    R: PaymentRepository,
    M: ReminderMailer,
{
    let mut outcome = ReminderOutcome::default();

    for (payment, due) in repo.reminder_queue(now)? {
        match mailer.send(&payment, &due) {
            Ok(()) => {
                repo.mark_reminder_provided(payment.id)?;
                outcome.sent.push(payment.id);
            }
            Err(e) => {
                warn!(payment = %payment.id, order = %payment.order_code, error = %e,
                    "reminder could not be sent; will retry next tick");
                outcome.failed.push(payment.id);
            }
        }
    }

    if !outcome.sent.is_empty() {
        info!(sent = outcome.sent.len(), "pre-notification reminders sent");
    }
    Ok(outcome)
}
