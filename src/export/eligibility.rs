//! Selection of payments eligible for a new export.

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{debug, warn};

use super::store::PaymentRepository;
use crate::core::{BatchScope, DebitError, EventConfig, Payment, ScopeRef};

/// One payment eligible for export, with its due date and event resolved.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub payment: Payment,
    pub due: NaiveDate,
    pub event: &'a EventConfig,
}

fn window_end(event: &EventConfig, now: DateTime<Utc>) -> Result<NaiveDate, DebitError> {
    let days = event.settings.prenotification_days.ok_or_else(|| {
        DebitError::Config(format!(
            "event '{}' has no pre-notification days configured",
            event.slug
        ))
    })?;
    let today = now.with_timezone(&event.timezone).date_naive();
    today
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| DebitError::Config("export window out of range".to_string()))
}

/// Select all payments of the scope that are confirmed, unclaimed, and due
/// within the per-event export window, `today + prenotification_days`.
/// Far-future due dates are left for a later run.
///
/// For an organizer scope, events with unusable settings are skipped and
/// logged; a single-event scope fails hard on bad settings instead.
pub fn select_unexported<'a, R: PaymentRepository>(
    repo: &R,
    scope: &'a BatchScope,
    now: DateTime<Utc>,
) -> Result<Vec<Candidate<'a>>, DebitError> {
    let lenient = matches!(scope.label, ScopeRef::Organizer(_));
    let mut candidates = Vec::new();

    for event in &scope.events {
        let until = match window_end(event, now) {
            Ok(date) => date,
            Err(e) if lenient => {
                warn!(event = %event.slug, error = %e, "skipping event with unusable settings");
                continue;
            }
            Err(e) => return Err(e),
        };

        let selected = repo.unexported_confirmed(&event.slug, scope.testmode, until)?;
        debug!(event = %event.slug, count = selected.len(), window_end = %until, "selected payments");
        candidates.extend(selected.into_iter().map(|(payment, due)| Candidate {
            payment,
            due: due.date,
            event,
        }));
    }

    Ok(candidates)
}
