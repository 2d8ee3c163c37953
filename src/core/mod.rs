//! Core domain types, configuration, and date arithmetic.
//!
//! This module provides the data model shared by the export batching engine
//! and the reminder scheduler: payments (consumed from the host), due dates,
//! exports and their entries, plus the pure due-date and banking-day logic.

pub mod calendar;
mod config;
mod duedate;
mod error;
mod reference;
mod types;
pub mod validation;

pub use calendar::next_collection_day;
pub use config::*;
pub use duedate::{ComputedDueDate, compute_due_date};
pub use error::*;
pub use reference::{MAX_REFERENCE_LEN, mandate_reference};
pub use types::*;
