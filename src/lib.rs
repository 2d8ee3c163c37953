//! # lastschrift
//!
//! SEPA direct-debit collection engine for ticketing/e-commerce hosts:
//! per-order due dates, pre-notification reminders, and batched export of
//! confirmed payments into ISO 20022 pain.008 Direct Debit Initiation files.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! The host owns the payment lifecycle and persistence; this crate plugs in
//! through the repository traits in [`export`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use lastschrift::core::*;
//!
//! let settings = DebitSettings {
//!     creditor_name: "Demo GmbH".into(),
//!     creditor_iban: "DE89370400440532013000".into(),
//!     creditor_bic: "COBADEFFXXX".into(),
//!     creditor_id: "DE98ZZZ09999999999".into(),
//!     reference_prefix: None,
//!     prenotification_days: Some(7),
//!     earliest_due_date: None,
//!     iban_blocklist: Vec::new(),
//!     reminder_templates_configured: false,
//!     default_mode: ExportMode::Split,
//! };
//! assert!(settings.validate().is_empty());
//!
//! let order_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let due = compute_due_date(order_date, &settings).unwrap();
//! assert_eq!(due.date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
//! assert!(!due.reminder_owed);
//!
//! // Collection never happens on a weekend or bank holiday.
//! let collect = next_collection_day(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
//! assert_eq!(collect, NaiveDate::from_ymd_opt(2024, 12, 27).unwrap());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Domain types, due dates, banking-day calendar, mandate references |
//! | `pain008` | pain.008.001.02 generation & validation |
//! | `export` | Eligibility, partitioning, batch runs, export recording |
//! | `debitlist` | CSV debit-list reporting |
//! | `reminder` | Pre-notification reminder scheduling |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "pain008")]
pub mod pain008;

#[cfg(feature = "export")]
pub mod export;

#[cfg(feature = "debitlist")]
pub mod debitlist;

#[cfg(feature = "reminder")]
pub mod reminder;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
