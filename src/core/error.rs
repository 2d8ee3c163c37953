use thiserror::Error;

use super::types::PaymentId;

/// Errors that can occur while collecting mandates or running an export batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DebitError {
    /// Missing or invalid scope configuration (e.g. no pre-notification days).
    #[error("configuration error: {0}")]
    Config(String),

    /// A confirmed payment without usable banking info was encountered.
    #[error("payment {0} has no usable banking info")]
    MissingBankingInfo(PaymentId),

    /// The generated file failed schema validation; the whole partition is rejected.
    #[error("schema validation failed with {} error(s)", .0.len())]
    Schema(Vec<ValidationError>),

    /// Storage-layer failure; nothing of the batch was committed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A payment in the batch was already claimed by another export.
    #[error("export conflict: {0}")]
    Conflict(String),

    /// An amount could not be expressed in whole minor currency units.
    #[error("amount error: {0}")]
    Amount(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Document construction encountered invalid input.
    #[error("builder error: {0}")]
    Builder(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Slash-separated path to the offending element (e.g. "PmtInf/ReqdColltnDt").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Identifier of the violated rule, if applicable.
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
