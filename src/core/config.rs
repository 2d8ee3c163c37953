use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::validation;

/// How debits with differing collection dates are distributed over files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportMode {
    /// One file per collection date.
    Split,
    /// One file; every debit moved to the latest collection date of the set.
    Move,
    /// One file keeping per-debit collection dates (rejected by some banks).
    Mix,
}

impl ExportMode {
    /// Stable identifier string, as stored in scope settings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Move => "move",
            Self::Mix => "mix",
        }
    }

    /// Parse from identifier string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "split" => Some(Self::Split),
            "move" => Some(Self::Move),
            "mix" => Some(Self::Mix),
            _ => None,
        }
    }
}

impl Default for ExportMode {
    fn default() -> Self {
        Self::Split
    }
}

/// Direct-debit settings of one event, resolved once per batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebitSettings {
    /// Creditor name printed into the file (max 70 chars).
    pub creditor_name: String,
    pub creditor_iban: String,
    pub creditor_bic: String,
    /// Regulator-issued SEPA creditor identifier.
    pub creditor_id: String,
    /// Optional prefix prepended to generated mandate references.
    pub reference_prefix: Option<String>,
    /// Days between order placement and the debit due date. Mandatory for
    /// due-date computation; `None` is a configuration error, not a default.
    pub prenotification_days: Option<u32>,
    /// Earliest date a debit may be due. Orders whose relative due date would
    /// fall before this are anchored here and owe a reminder email.
    pub earliest_due_date: Option<NaiveDate>,
    /// IBANs or IBAN prefixes the organizer refuses to debit.
    pub iban_blocklist: Vec<String>,
    /// Whether the host has reminder mail templates configured. Required when
    /// `earliest_due_date` is used.
    pub reminder_templates_configured: bool,
    /// Default splitting mode preselected for export runs.
    pub default_mode: ExportMode,
}

impl DebitSettings {
    /// Validate the creditor-side settings. Returns all problems found.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.creditor_name.trim().is_empty() {
            errors.push(ValidationError::new(
                "creditor_name",
                "creditor name must not be empty",
            ));
        } else if self.creditor_name.chars().count() > 70 {
            errors.push(ValidationError::new(
                "creditor_name",
                "creditor name must not exceed 70 characters",
            ));
        }

        if let Err(e) = validation::validate_iban(&self.creditor_iban) {
            errors.push(ValidationError::new("creditor_iban", e.to_string()));
        }
        if let Err(e) = validation::validate_bic(&self.creditor_bic) {
            errors.push(ValidationError::new("creditor_bic", e.to_string()));
        }
        if let Err(e) = validation::validate_creditor_id(&self.creditor_id) {
            errors.push(ValidationError::new("creditor_id", e.to_string()));
        }

        if let Some(prefix) = &self.reference_prefix {
            if let Err(e) = validation::validate_reference_charset(prefix) {
                errors.push(ValidationError::new("reference_prefix", e.to_string()));
            }
        }

        if self.earliest_due_date.is_some() && !self.reminder_templates_configured {
            errors.push(ValidationError::new(
                "earliest_due_date",
                "reminder mail templates are required when an earliest due date is set",
            ));
        }

        errors
    }
}

/// One event participating in an export run, with its resolved settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub slug: String,
    /// ISO 4217 currency of the event.
    pub currency: String,
    pub testmode: bool,
    /// Event timezone; "today" for collection dates is taken in this zone.
    pub timezone: Tz,
    pub settings: DebitSettings,
}

impl EventConfig {
    /// The creditor partition key of this event. Two events share a file
    /// only if every field of this key matches.
    pub fn creditor_key(&self) -> CreditorKey {
        CreditorKey {
            name: self.settings.creditor_name.clone(),
            iban: self.settings.creditor_iban.clone(),
            bic: self.settings.creditor_bic.clone(),
            creditor_id: self.settings.creditor_id.clone(),
            currency: self.currency.clone(),
        }
    }
}

/// Creditor configuration tuple a single SEPA file may declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreditorKey {
    pub name: String,
    pub iban: String,
    pub bic: String,
    pub creditor_id: String,
    pub currency: String,
}

/// The scope one batch run operates on, resolved before the run starts and
/// never re-read mid-run.
#[derive(Debug, Clone)]
pub struct BatchScope {
    pub label: super::types::ScopeRef,
    /// Events covered by the scope. Exactly one for event scope; all events
    /// with the plugin enabled for organizer scope.
    pub events: Vec<EventConfig>,
    /// Test-mode flag payments must match. Organizer-wide exports never
    /// include test-mode payments.
    pub testmode: bool,
}

impl BatchScope {
    /// Scope over a single event; inherits the event's test-mode flag.
    pub fn event(event: EventConfig) -> Self {
        Self {
            label: super::types::ScopeRef::Event(event.slug.clone()),
            testmode: event.testmode,
            events: vec![event],
        }
    }

    /// Scope over all of an organizer's events. Test-mode payments are
    /// always excluded at organizer level.
    pub fn organizer(slug: impl Into<String>, events: Vec<EventConfig>) -> Self {
        Self {
            label: super::types::ScopeRef::Organizer(slug.into()),
            events,
            testmode: false,
        }
    }
}
