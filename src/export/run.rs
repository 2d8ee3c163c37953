//! The batch-run entry point: select, partition, build, validate, record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::eligibility::select_unexported;
use super::partition::{Partition, partition};
use super::store::{
    AcceptedPartition, EntryDraft, ExportDraft, ExportRepository, PaymentRepository,
};
use crate::core::{
    BatchScope, CreditorKey, DebitError, Export, ExportEntry, ExportId, ExportMode, PaymentId,
    ValidationError,
};
use crate::pain008::{DebitDocument, DebitTransaction, amount_to_cents, validate_pain008};

/// Operator-facing result classification of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSummary {
    /// No eligible payments; nothing was created.
    NoneEligible,
    /// One export file was created.
    OneFile,
    /// Several export files were created; the operator must process all.
    MultipleFiles(usize),
}

/// A partition that was dropped because its file failed to build or
/// validate. None of its payments were recorded; they stay eligible.
#[derive(Debug, Clone)]
pub struct RejectedPartition {
    pub creditor: CreditorKey,
    pub collection_date: Option<chrono::NaiveDate>,
    pub errors: Vec<ValidationError>,
}

/// Result of one batch-export run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// IDs of the exports committed in this run.
    pub exports: Vec<ExportId>,
    pub rejected: Vec<RejectedPartition>,
    /// Payments flagged back to failed for missing banking info.
    pub flagged: Vec<PaymentId>,
    pub summary: BatchSummary,
}

fn build_partition(
    part: &Partition<'_>,
    msg_id: &str,
    now: DateTime<Utc>,
) -> Result<(String, Vec<EntryDraft>), DebitError> {
    let mut doc = DebitDocument::new(part.creditor.clone(), msg_id, now);
    let mut entries = Vec::with_capacity(part.items.len());

    for item in &part.items {
        let payment = &item.candidate.payment;
        let event = item.candidate.event;
        let info = payment
            .banking
            .provided()
            .ok_or(DebitError::MissingBankingInfo(payment.id))?;

        let amount = payment.remaining_amount();
        doc.add_transaction(DebitTransaction {
            end_to_end_id: None,
            debtor_name: info.account_holder.clone(),
            debtor_iban: info.iban.clone(),
            debtor_bic: info.bic.clone(),
            amount_cents: amount_to_cents(amount)?,
            collection_date: item.collection_date,
            mandate_id: info.mandate_reference.clone(),
            mandate_date: payment
                .order_date
                .with_timezone(&event.timezone)
                .date_naive(),
            description: format!(
                "Event ticket {}-{}",
                event.slug.to_uppercase(),
                payment.order_code
            ),
        });
        entries.push(EntryDraft {
            payment: payment.id,
            order_code: payment.order_code.clone(),
            order_date: payment.order_date,
            invoice_numbers: payment.invoice_numbers.clone(),
            amount,
        });
    }

    Ok((doc.render()?, entries))
}

/// Run one export batch over a scope.
///
/// Every accepted partition becomes one export file; all accepted
/// partitions are committed atomically, so a payment is never marked
/// exported without its file being durably stored. Partitions whose file
/// fails validation are rejected individually and their payments remain
/// eligible for the next run.
pub fn run_export<R>(
    repo: &mut R,
    scope: &BatchScope,
    mode: ExportMode,
    now: DateTime<Utc>,
) -> Result<BatchOutcome, DebitError>
where
    R: PaymentRepository + ExportRepository,
{
    let candidates = select_unexported(repo, scope, now)?;

    // Confirmed payments without banking info cannot be debited; flag them
    // back for manual follow-up and keep going.
    let mut flagged = Vec::new();
    let mut usable = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.payment.banking.provided().is_some() {
            usable.push(candidate);
        } else {
            warn!(payment = %candidate.payment.id, order = %candidate.payment.order_code,
                "confirmed payment has no banking info; flagging as failed");
            repo.mark_payment_failed(candidate.payment.id)?;
            flagged.push(candidate.payment.id);
        }
    }

    if usable.is_empty() {
        return Ok(BatchOutcome {
            exports: Vec::new(),
            rejected: Vec::new(),
            flagged,
            summary: BatchSummary::NoneEligible,
        });
    }

    let scope_tag: String = scope.label.slug_upper().chars().take(15).collect();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (idx, part) in partition(usable, mode, now).into_iter().enumerate() {
        let msg_id = format!("{}-{}-{}", scope_tag, now.format("%Y%m%d%H%M%S"), idx + 1);

        let (xml, entries) = match build_partition(&part, &msg_id, now) {
            Ok(built) => built,
            Err(e) => {
                warn!(creditor = %part.creditor.name, error = %e, "partition could not be built");
                rejected.push(RejectedPartition {
                    creditor: part.creditor,
                    collection_date: part.collection_date,
                    errors: vec![ValidationError::new("document", e.to_string())],
                });
                continue;
            }
        };

        let errors = validate_pain008(&xml);
        if !errors.is_empty() {
            warn!(creditor = %part.creditor.name, errors = errors.len(),
                "generated file failed schema validation; rejecting partition");
            rejected.push(RejectedPartition {
                creditor: part.creditor,
                collection_date: part.collection_date,
                errors,
            });
            continue;
        }

        accepted.push(AcceptedPartition {
            export: ExportDraft {
                scope: scope.label.clone(),
                xml,
                created_at: now,
                testmode: scope.testmode,
                currency: part.creditor.currency.clone(),
                collection_date: part.collection_date,
            },
            entries,
        });
    }

    let exports = if accepted.is_empty() {
        Vec::new()
    } else {
        let ids = repo.commit_batch(accepted)?;
        info!(count = ids.len(), scope = %scope.label.slug_upper(), "export files committed");
        ids
    };

    let summary = match exports.len() {
        0 => BatchSummary::NoneEligible,
        1 => BatchSummary::OneFile,
        n => BatchSummary::MultipleFiles(n),
    };

    Ok(BatchOutcome {
        exports,
        rejected,
        flagged,
        summary,
    })
}

/// Download file name of an export:
/// `{SCOPE}-{creation timestamp}[--{collection date}].xml`.
pub fn export_filename(export: &Export) -> String {
    let mut name = format!(
        "{}-{}",
        export.scope.slug_upper(),
        export.created_at.format("%Y-%m-%d-%H-%M-%S")
    );
    if let Some(date) = export.collection_date {
        name.push_str(&format!("--{date}"));
    }
    name.push_str(".xml");
    name
}

/// Listing row for the operator's export overview.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub export: Export,
    pub entry_count: usize,
    pub total_amount: Decimal,
}

/// All exports of a scope with entry counts and amount sums, newest first.
pub fn list_exports<R: ExportRepository>(
    repo: &R,
    scope: &crate::core::ScopeRef,
) -> Result<Vec<ExportSummary>, DebitError> {
    let mut out = Vec::new();
    for export in repo.exports(scope)? {
        let entries: Vec<ExportEntry> = repo.entries(export.id)?;
        out.push(ExportSummary {
            entry_count: entries.len(),
            total_amount: entries.iter().map(|e| e.amount).sum(),
            export,
        });
    }
    Ok(out)
}
