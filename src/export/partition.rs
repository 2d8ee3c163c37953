//! Partitioning of eligible payments into export files.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};

use super::eligibility::Candidate;
use crate::core::{CreditorKey, ExportMode, next_collection_day};

/// A candidate with its effective collection date fixed.
#[derive(Debug, Clone)]
pub struct ScheduledDebit<'a> {
    pub candidate: Candidate<'a>,
    pub collection_date: NaiveDate,
}

/// One future export file: a creditor configuration plus either a uniform
/// collection date or per-debit dates (`collection_date: None`, mix mode).
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub creditor: CreditorKey,
    pub collection_date: Option<NaiveDate>,
    pub items: Vec<ScheduledDebit<'a>>,
}

/// Earliest bank-valid collection date for a candidate: never before today
/// in the event's timezone, even when the due date has already elapsed.
pub fn collection_date_for(candidate: &Candidate<'_>, now: DateTime<Utc>) -> NaiveDate {
    let today = now.with_timezone(&candidate.event.timezone).date_naive();
    next_collection_day(today.max(candidate.due))
}

/// Group candidates into partitions according to the splitting mode.
///
/// - `Split`: one partition per (creditor, collection date).
/// - `Move`: one partition per creditor; every debit is moved to the latest
///   collection date of the whole candidate set.
/// - `Mix`: one partition per creditor with per-debit dates, unless the set
///   has only one distinct date anyway, in which case the partition is keyed
///   by that date like a split.
pub fn partition<'a>(
    candidates: Vec<Candidate<'a>>,
    mode: ExportMode,
    now: DateTime<Utc>,
) -> Vec<Partition<'a>> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let natural: Vec<NaiveDate> = candidates
        .iter()
        .map(|c| collection_date_for(c, now))
        .collect();
    let distinct: BTreeSet<NaiveDate> = natural.iter().copied().collect();
    // Non-empty by the guard above.
    let latest = *distinct.iter().next_back().expect("at least one date");
    let single_dated = mode != ExportMode::Mix || distinct.len() == 1;

    let mut groups: BTreeMap<(CreditorKey, Option<NaiveDate>), Vec<ScheduledDebit<'a>>> =
        BTreeMap::new();
    for (candidate, date) in candidates.into_iter().zip(natural) {
        let effective = match mode {
            ExportMode::Move => latest,
            _ => date,
        };
        let key = (
            candidate.event.creditor_key(),
            single_dated.then_some(effective),
        );
        groups.entry(key).or_default().push(ScheduledDebit {
            candidate,
            collection_date: effective,
        });
    }

    groups
        .into_iter()
        .map(|((creditor, collection_date), items)| Partition {
            creditor,
            collection_date,
            items,
        })
        .collect()
}
