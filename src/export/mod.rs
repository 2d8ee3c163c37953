//! The export batching engine.
//!
//! Orchestrated by [`run_export`]: eligible payments are selected per scope,
//! partitioned by creditor configuration and collection date, rendered into
//! pain.008 files, validated, and recorded atomically so every payment is
//! exported at most once.

mod eligibility;
mod memory;
mod partition;
mod run;
mod store;

pub use eligibility::{Candidate, select_unexported};
pub use memory::MemoryStore;
pub use partition::{Partition, ScheduledDebit, collection_date_for, partition};
pub use run::{
    BatchOutcome, BatchSummary, ExportSummary, RejectedPartition, export_filename, list_exports,
    run_export,
};
pub use store::{
    AcceptedPartition, EntryDraft, ExportDraft, ExportRepository, PaymentRepository,
};
