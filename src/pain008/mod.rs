//! SEPA Direct Debit Initiation (pain.008) generation and validation.
//!
//! Builds ISO 20022 pain.008.001.02 documents from collected mandates and
//! validates the serialized XML before it is recorded as an export.
//!
//! # Example
//!
//! ```no_run
//! use lastschrift::core::CreditorKey;
//! use lastschrift::pain008::{DebitDocument, DebitTransaction, validate_pain008};
//!
//! let creditor: CreditorKey = todo!(); // from an EventConfig
//! let mut doc = DebitDocument::new(creditor, "DEMO-20240101-1", chrono::Utc::now());
//! let tx: DebitTransaction = todo!();
//! doc.add_transaction(tx);
//! let xml = doc.render().unwrap();
//! assert!(validate_pain008(&xml).is_empty());
//! ```

mod document;
mod validate;
pub(crate) mod xml_utils;

pub use document::{DebitDocument, DebitTransaction, amount_to_cents};
pub use validate::validate_pain008;
pub use xml_utils::format_cents;

/// pain.008.001.02 document namespace.
pub const PAIN_008_NS: &str = "urn:iso:std:iso:20022:tech:xsd:pain.008.001.02";

/// XML Schema instance namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
