//! Repository seams between the batching engine and the host's persistence.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::core::{
    DebitError, DueDate, Export, ExportEntry, ExportId, Payment, PaymentId, ScopeRef,
};

/// A new export file with the entries claiming its payments, ready to be
/// persisted as one unit.
#[derive(Debug, Clone)]
pub struct AcceptedPartition {
    pub export: ExportDraft,
    pub entries: Vec<EntryDraft>,
}

/// Export row before an ID is assigned by the store.
#[derive(Debug, Clone)]
pub struct ExportDraft {
    pub scope: ScopeRef,
    pub xml: String,
    pub created_at: DateTime<Utc>,
    pub testmode: bool,
    pub currency: String,
    pub collection_date: Option<NaiveDate>,
}

/// Export entry row before its export ID is known.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub payment: PaymentId,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    pub invoice_numbers: Vec<String>,
    /// Captured amount, frozen at export time.
    pub amount: Decimal,
}

/// Read/write access to payments and their due dates.
pub trait PaymentRepository {
    /// Confirmed payments of one event, matching the given test-mode flag,
    /// not yet claimed by any export entry, whose due date falls on or
    /// before `due_on_or_before`.
    fn unexported_confirmed(
        &self,
        event_slug: &str,
        testmode: bool,
        due_on_or_before: NaiveDate,
    ) -> Result<Vec<(Payment, DueDate)>, DebitError>;

    /// Flag a confirmed payment back to failed (and its order back to a
    /// non-final state, host-side) because its banking info is unusable.
    fn mark_payment_failed(&mut self, payment: PaymentId) -> Result<(), DebitError>;

    /// Due dates whose reminder is outstanding, whose threshold has passed,
    /// and whose payment is still confirmed.
    fn reminder_queue(&self, now: DateTime<Utc>) -> Result<Vec<(Payment, DueDate)>, DebitError>;

    /// Flip a due date's reminder state to provided.
    fn mark_reminder_provided(&mut self, payment: PaymentId) -> Result<(), DebitError>;
}

/// Read/write access to exports and their entries.
pub trait ExportRepository {
    /// Persist all accepted partitions of one run atomically.
    ///
    /// Implementations must claim the included payments under row-level
    /// locking and fail the entire batch with [`DebitError::Conflict`] if
    /// any payment is already claimed by an existing entry; this is what
    /// makes overlapping runs safe. On any error nothing is committed.
    fn commit_batch(
        &mut self,
        partitions: Vec<AcceptedPartition>,
    ) -> Result<Vec<ExportId>, DebitError>;

    /// All exports of a scope, newest first.
    fn exports(&self, scope: &ScopeRef) -> Result<Vec<Export>, DebitError>;

    /// Entries of one export.
    fn entries(&self, export: ExportId) -> Result<Vec<ExportEntry>, DebitError>;

    /// Delete an export and its entries, making the payments selectable
    /// again. Fails once the export has been shredded.
    fn revert_export(&mut self, export: ExportId) -> Result<(), DebitError>;

    /// Replace the XML payloads of all exports in a scope with a shredded
    /// placeholder. Irreversible. Returns the number of exports redacted.
    fn shred_scope(&mut self, scope: &ScopeRef) -> Result<usize, DebitError>;
}
