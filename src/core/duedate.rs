//! Due-date computation for direct-debit payments.

use chrono::{DateTime, Days, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::config::DebitSettings;
use super::error::DebitError;
use super::types::{DueDate, PaymentId, ReminderState};

/// Result of the due-date computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedDueDate {
    pub date: NaiveDate,
    /// True iff the earliest-due-date override pushed the date past the
    /// relative one. Anchored dates legally require a separate
    /// pre-notification email; purely relative dates are already covered
    /// by the order confirmation.
    pub reminder_owed: bool,
}

/// Compute the due date for an order placed (or confirmed) on `order_date`.
///
/// The relative due date is `order_date + prenotification_days`. If the
/// configured earliest due date is strictly later, it wins and a reminder
/// is owed. Missing pre-notification days are a configuration error.
pub fn compute_due_date(
    order_date: NaiveDate,
    settings: &DebitSettings,
) -> Result<ComputedDueDate, DebitError> {
    let days = settings.prenotification_days.ok_or_else(|| {
        DebitError::Config("prenotification_days is not configured".to_string())
    })?;
    let relative = order_date
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| DebitError::Config("due date out of range".to_string()))?;

    match settings.earliest_due_date {
        Some(earliest) if earliest > relative => Ok(ComputedDueDate {
            date: earliest,
            reminder_owed: true,
        }),
        _ => Ok(ComputedDueDate {
            date: relative,
            reminder_owed: false,
        }),
    }
}

impl DueDate {
    /// Build the due-date record at payment confirmation time.
    ///
    /// `remind_after` is the due date combined with the confirmation
    /// time-of-day in the event timezone, so the reminder job's load spreads
    /// over the day instead of firing for all rows at midnight.
    pub fn on_confirmation(
        payment: PaymentId,
        settings: &DebitSettings,
        confirmed_at: DateTime<Utc>,
        timezone: Tz,
    ) -> Result<Self, DebitError> {
        let local = confirmed_at.with_timezone(&timezone);
        let computed = compute_due_date(local.date_naive(), settings)?;

        let threshold_naive = computed.date.and_time(local.time());
        let remind_after = match timezone.from_local_datetime(&threshold_naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(dt, _) => dt,
            // Nonexistent local time (DST gap); interpreting as UTC is off by
            // at most the zone offset, which is irrelevant at day granularity.
            LocalResult::None => timezone.from_utc_datetime(&threshold_naive),
        }
        .with_timezone(&Utc);

        Ok(Self {
            payment,
            date: computed.date,
            reminder: if computed.reminder_owed {
                ReminderState::Outstanding
            } else {
                ReminderState::Provided
            },
            remind_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(days: Option<u32>, earliest: Option<NaiveDate>) -> DebitSettings {
        DebitSettings {
            creditor_name: "Demo GmbH".into(),
            creditor_iban: "DE89370400440532013000".into(),
            creditor_bic: "COBADEFFXXX".into(),
            creditor_id: "DE98ZZZ09999999999".into(),
            reference_prefix: None,
            prenotification_days: days,
            earliest_due_date: earliest,
            iban_blocklist: Vec::new(),
            reminder_templates_configured: earliest.is_some(),
            default_mode: Default::default(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn relative_due_date() {
        let got = compute_due_date(date(2024, 1, 1), &settings(Some(7), None)).unwrap();
        assert_eq!(got.date, date(2024, 1, 8));
        assert!(!got.reminder_owed);
    }

    #[test]
    fn earliest_override_owes_reminder() {
        let got = compute_due_date(
            date(2024, 1, 3),
            &settings(Some(7), Some(date(2024, 1, 20))),
        )
        .unwrap();
        assert_eq!(got.date, date(2024, 1, 20));
        assert!(got.reminder_owed);
    }

    #[test]
    fn earliest_equal_does_not_override() {
        // Equality keeps the relative date and owes no reminder.
        let got = compute_due_date(
            date(2024, 1, 13),
            &settings(Some(7), Some(date(2024, 1, 20))),
        )
        .unwrap();
        assert_eq!(got.date, date(2024, 1, 20));
        assert!(!got.reminder_owed);
    }

    #[test]
    fn missing_prenotification_days_fails_fast() {
        let err = compute_due_date(date(2024, 1, 1), &settings(None, None)).unwrap_err();
        assert!(matches!(err, DebitError::Config(_)));
    }
}
