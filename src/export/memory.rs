//! In-memory reference store.
//!
//! Serves as the reference implementation of the repository contracts
//! (including the claim re-check inside `commit_batch`) and as the test
//! double for the batching engine. A production deployment backs the same
//! traits with the host's database and `SELECT ... FOR UPDATE`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::store::{AcceptedPartition, ExportRepository, PaymentRepository};
use crate::core::{
    DebitError, DueDate, Export, ExportEntry, ExportId, ExportPayload, Payment, PaymentId,
    PaymentState, ReminderState, ScopeRef,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    payments: BTreeMap<PaymentId, Payment>,
    due_dates: BTreeMap<PaymentId, DueDate>,
    exports: BTreeMap<ExportId, Export>,
    entries: Vec<ExportEntry>,
    next_export_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_export_id: 1,
            ..Self::default()
        }
    }

    /// Register a payment together with its due-date record.
    ///
    /// Panics if the due date belongs to a different payment; the one-to-one
    /// invariant is not negotiable.
    pub fn insert_payment(&mut self, payment: Payment, due: DueDate) {
        assert_eq!(payment.id, due.payment, "due date belongs to another payment");
        self.due_dates.insert(payment.id, due);
        self.payments.insert(payment.id, payment);
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.get(&id)
    }

    pub fn due_date(&self, id: PaymentId) -> Option<&DueDate> {
        self.due_dates.get(&id)
    }

    pub fn export(&self, id: ExportId) -> Option<&Export> {
        self.exports.get(&id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn is_claimed(&self, payment: PaymentId) -> bool {
        self.entries.iter().any(|e| e.payment == payment)
    }
}

impl PaymentRepository for MemoryStore {
    fn unexported_confirmed(
        &self,
        event_slug: &str,
        testmode: bool,
        due_on_or_before: NaiveDate,
    ) -> Result<Vec<(Payment, DueDate)>, DebitError> {
        let mut out = Vec::new();
        for payment in self.payments.values() {
            if payment.event_slug != event_slug
                || payment.state != PaymentState::Confirmed
                || payment.testmode != testmode
                || self.is_claimed(payment.id)
            {
                continue;
            }
            let Some(due) = self.due_dates.get(&payment.id) else {
                continue;
            };
            if due.date <= due_on_or_before {
                out.push((payment.clone(), due.clone()));
            }
        }
        Ok(out)
    }

    fn mark_payment_failed(&mut self, payment: PaymentId) -> Result<(), DebitError> {
        let p = self
            .payments
            .get_mut(&payment)
            .ok_or_else(|| DebitError::Persistence(format!("unknown payment {payment}")))?;
        p.state = PaymentState::Failed;
        Ok(())
    }

    fn reminder_queue(&self, now: DateTime<Utc>) -> Result<Vec<(Payment, DueDate)>, DebitError> {
        let mut out = Vec::new();
        for due in self.due_dates.values() {
            if due.reminder != ReminderState::Outstanding || due.remind_after > now {
                continue;
            }
            let Some(payment) = self.payments.get(&due.payment) else {
                continue;
            };
            if payment.state == PaymentState::Confirmed {
                out.push((payment.clone(), due.clone()));
            }
        }
        Ok(out)
    }

    fn mark_reminder_provided(&mut self, payment: PaymentId) -> Result<(), DebitError> {
        let due = self
            .due_dates
            .get_mut(&payment)
            .ok_or_else(|| DebitError::Persistence(format!("no due date for payment {payment}")))?;
        due.reminder = ReminderState::Provided;
        Ok(())
    }
}

impl ExportRepository for MemoryStore {
    fn commit_batch(
        &mut self,
        partitions: Vec<AcceptedPartition>,
    ) -> Result<Vec<ExportId>, DebitError> {
        // Claim check before any write, covering both pre-existing entries
        // and duplicates within the batch itself. Nothing is mutated unless
        // every claim succeeds.
        let mut claiming = std::collections::BTreeSet::new();
        for partition in &partitions {
            for entry in &partition.entries {
                if self.is_claimed(entry.payment) || !claiming.insert(entry.payment) {
                    return Err(DebitError::Conflict(format!(
                        "payment {} is already claimed by another export",
                        entry.payment
                    )));
                }
            }
        }

        let mut ids = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let id = ExportId(self.next_export_id);
            self.next_export_id += 1;

            let draft = partition.export;
            self.exports.insert(
                id,
                Export {
                    id,
                    scope: draft.scope,
                    payload: ExportPayload::Xml(draft.xml),
                    created_at: draft.created_at,
                    testmode: draft.testmode,
                    currency: draft.currency,
                    collection_date: draft.collection_date,
                },
            );
            for entry in partition.entries {
                self.entries.push(ExportEntry {
                    export: id,
                    payment: entry.payment,
                    order_code: entry.order_code,
                    order_date: entry.order_date,
                    invoice_numbers: entry.invoice_numbers,
                    amount: entry.amount,
                });
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn exports(&self, scope: &ScopeRef) -> Result<Vec<Export>, DebitError> {
        let mut out: Vec<Export> = self
            .exports
            .values()
            .filter(|e| e.scope == *scope)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn entries(&self, export: ExportId) -> Result<Vec<ExportEntry>, DebitError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.export == export)
            .cloned()
            .collect())
    }

    fn revert_export(&mut self, export: ExportId) -> Result<(), DebitError> {
        let existing = self
            .exports
            .get(&export)
            .ok_or_else(|| DebitError::Persistence(format!("unknown export {}", export.0)))?;
        if existing.payload == ExportPayload::Shredded {
            return Err(DebitError::Persistence(
                "export has been shredded and can no longer be reverted".to_string(),
            ));
        }
        self.entries.retain(|e| e.export != export);
        self.exports.remove(&export);
        Ok(())
    }

    fn shred_scope(&mut self, scope: &ScopeRef) -> Result<usize, DebitError> {
        let mut count = 0;
        for export in self.exports.values_mut() {
            if export.scope == *scope && export.payload != ExportPayload::Shredded {
                export.payload = ExportPayload::Shredded;
                count += 1;
            }
        }
        Ok(count)
    }
}
