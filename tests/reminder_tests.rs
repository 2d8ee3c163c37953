#![cfg(feature = "reminder")]

use chrono::{DateTime, Duration, Utc};
use lastschrift::core::*;
use lastschrift::export::MemoryStore;
use lastschrift::reminder::{ReminderMailer, ReminderOutcome, send_due_reminders};
use rust_decimal_macros::dec;

fn now() -> DateTime<Utc> {
    "2024-07-10T12:00:00Z".parse().unwrap()
}

fn payment(id: u64, state: PaymentState) -> Payment {
    Payment {
        id: PaymentId(id),
        order_code: format!("C{id:04}"),
        event_slug: "democon".into(),
        amount: dec!(23.50),
        refund_amount: dec!(0),
        state,
        order_date: "2024-06-01T09:00:00Z".parse().unwrap(),
        testmode: false,
        banking: MandateInfo::Provided(BankingInfo {
            account_holder: "Erika Musterfrau".into(),
            iban: "DE02120300000000202051".into(),
            bic: "BYLADEM1001".into(),
            mandate_reference: format!("DEMOCON-C{id:04}"),
        }),
        invoice_numbers: Vec::new(),
    }
}

fn due(id: u64, reminder: ReminderState, remind_after: DateTime<Utc>) -> DueDate {
    DueDate {
        payment: PaymentId(id),
        date: remind_after.date_naive(),
        reminder,
        remind_after,
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Vec<PaymentId>,
    fail_for: Vec<PaymentId>,
}

impl ReminderMailer for RecordingMailer {
    fn send(&mut self, payment: &Payment, _due: &DueDate) -> Result<(), DebitError> {
        if self.fail_for.contains(&payment.id) {
            return Err(DebitError::Persistence("mailer unavailable".into()));
        }
        self.sent.push(payment.id);
        Ok(())
    }
}

#[test]
fn only_elapsed_outstanding_reminders_are_sent() {
    let mut store = MemoryStore::new();
    // Thresholds from five days past to four days ahead; six have elapsed.
    for (id, offset) in (-5i64..5).enumerate() {
        let id = id as u64 + 1;
        store.insert_payment(
            payment(id, PaymentState::Confirmed),
            due(id, ReminderState::Outstanding, now() + Duration::days(offset)),
        );
    }

    let mut mailer = RecordingMailer::default();
    let outcome = send_due_reminders(&mut store, &mut mailer, now()).unwrap();

    assert_eq!(outcome.sent.len(), 6);
    assert!(outcome.failed.is_empty());
    assert_eq!(mailer.sent.len(), 6);
    for id in &outcome.sent {
        assert_eq!(store.due_date(*id).unwrap().reminder, ReminderState::Provided);
    }
}

#[test]
fn provided_reminders_are_not_resent() {
    let mut store = MemoryStore::new();
    store.insert_payment(
        payment(1, PaymentState::Confirmed),
        due(1, ReminderState::Provided, now() - Duration::days(1)),
    );

    let mut mailer = RecordingMailer::default();
    let outcome = send_due_reminders(&mut store, &mut mailer, now()).unwrap();
    assert!(outcome.sent.is_empty());
    assert!(mailer.sent.is_empty());
}

#[test]
fn reminders_skip_payments_no_longer_confirmed() {
    let mut store = MemoryStore::new();
    store.insert_payment(
        payment(1, PaymentState::Canceled),
        due(1, ReminderState::Outstanding, now() - Duration::days(1)),
    );
    store.insert_payment(
        payment(2, PaymentState::Refunded),
        due(2, ReminderState::Outstanding, now() - Duration::days(1)),
    );

    let mut mailer = RecordingMailer::default();
    let outcome = send_due_reminders(&mut store, &mut mailer, now()).unwrap();
    assert!(outcome.sent.is_empty());
}

#[test]
fn failed_sends_stay_outstanding_for_the_next_tick() {
    let mut store = MemoryStore::new();
    store.insert_payment(
        payment(1, PaymentState::Confirmed),
        due(1, ReminderState::Outstanding, now() - Duration::days(1)),
    );
    store.insert_payment(
        payment(2, PaymentState::Confirmed),
        due(2, ReminderState::Outstanding, now() - Duration::days(1)),
    );

    let mut mailer = RecordingMailer {
        fail_for: vec![PaymentId(1)],
        ..RecordingMailer::default()
    };
    let outcome = send_due_reminders(&mut store, &mut mailer, now()).unwrap();

    assert_eq!(outcome.sent, vec![PaymentId(2)]);
    assert_eq!(outcome.failed, vec![PaymentId(1)]);
    assert_eq!(
        store.due_date(PaymentId(1)).unwrap().reminder,
        ReminderState::Outstanding
    );

    // Next tick retries the failed one.
    let mut healthy = RecordingMailer::default();
    let retry: ReminderOutcome = send_due_reminders(&mut store, &mut healthy, now()).unwrap();
    assert_eq!(retry.sent, vec![PaymentId(1)]);
}
