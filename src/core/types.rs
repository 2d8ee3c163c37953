use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a payment record in the host system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(pub u64);

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a generated export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExportId(pub u64);

/// Lifecycle state of a payment, as reported by the host.
///
/// Only `Confirmed` payments are eligible for export. A payment that turns
/// out to lack banking info at export time is flagged back to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    Created,
    Pending,
    Confirmed,
    Failed,
    Canceled,
    Refunded,
}

/// Banking details collected with the direct-debit mandate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankingInfo {
    /// Account holder name as entered by the customer.
    pub account_holder: String,
    /// Debtor IBAN.
    pub iban: String,
    /// Debtor BIC.
    pub bic: String,
    /// Unique mandate reference assigned at confirmation time.
    pub mandate_reference: String,
}

/// Mandate/banking info attached to a payment.
///
/// Replaces the host's untyped info blob: the info is either present,
/// irreversibly redacted by a data-retention shred, or missing entirely
/// (which should not happen for a confirmed payment, but is representable
/// so the batch runner can flag it instead of panicking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MandateInfo {
    Provided(BankingInfo),
    Redacted,
    Missing,
}

impl MandateInfo {
    /// Banking info if still present and unredacted.
    pub fn provided(&self) -> Option<&BankingInfo> {
        match self {
            Self::Provided(info) => Some(info),
            _ => None,
        }
    }
}

/// A payment record, owned by the host and consumed read-only here
/// (except for the failure flag set on missing banking info).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Order code of the owning order.
    pub order_code: String,
    /// Slug of the event the order belongs to.
    pub event_slug: String,
    /// Gross payment amount.
    pub amount: Decimal,
    /// Sum of completed refunds against this payment.
    pub refund_amount: Decimal,
    pub state: PaymentState,
    /// Placement timestamp of the owning order (mandate signing date).
    pub order_date: DateTime<Utc>,
    pub testmode: bool,
    pub banking: MandateInfo,
    /// Invoice numbers of the owning order, carried for reporting.
    pub invoice_numbers: Vec<String>,
}

impl Payment {
    /// Amount still to be collected: gross amount minus completed refunds.
    pub fn remaining_amount(&self) -> Decimal {
        self.amount - self.refund_amount
    }
}

/// Whether the pre-notification reminder for a due date is still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderState {
    /// Reminder still has to be sent before collection.
    Outstanding,
    /// Reminder sent, or never owed (order confirmation covered the notice).
    Provided,
}

/// Direct-debit due date, one-to-one with a payment.
///
/// Created once when the payment is confirmed, never re-created; only the
/// reminder state is flipped afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueDate {
    pub payment: PaymentId,
    /// Computed (or override-anchored) due date.
    pub date: NaiveDate,
    pub reminder: ReminderState,
    /// Earliest instant the reminder job may pick this row up. Fixed at
    /// creation; carries the confirmation time-of-day to spread job load.
    pub remind_after: DateTime<Utc>,
}

/// Scope an export was created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeRef {
    /// A single event, identified by slug.
    Event(String),
    /// All events of an organizer, identified by organizer slug.
    Organizer(String),
}

impl ScopeRef {
    /// Scope identifier used in file names, uppercased.
    pub fn slug_upper(&self) -> String {
        match self {
            Self::Event(s) | Self::Organizer(s) => s.to_uppercase(),
        }
    }
}

/// Stored XML payload of an export; shredding replaces it irreversibly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPayload {
    Xml(String),
    Shredded,
}

impl ExportPayload {
    pub fn xml(&self) -> Option<&str> {
        match self {
            Self::Xml(x) => Some(x),
            Self::Shredded => None,
        }
    }
}

/// One generated SEPA pain.008 file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub id: ExportId,
    pub scope: ScopeRef,
    pub payload: ExportPayload,
    pub created_at: DateTime<Utc>,
    pub testmode: bool,
    /// ISO 4217 currency of all transactions in the file.
    pub currency: String,
    /// Uniform collection date, present unless the file mixes dates.
    pub collection_date: Option<NaiveDate>,
}

/// Durable link between an export and one included payment.
///
/// A payment appears in at most one entry across all exports; this is the
/// at-most-once-export guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub export: ExportId,
    pub payment: PaymentId,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    pub invoice_numbers: Vec<String>,
    /// Amount captured in the file, frozen at export time.
    pub amount: Decimal,
}
