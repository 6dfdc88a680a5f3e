//! Payment ledger: append-only record of completed charges, keyed by the
//! external charge reference.
//!
//! This is the settlement's source of idempotency truth. `record_if_absent`
//! is an atomic insert-if-absent, so two racing first calls for the same
//! charge cannot both believe they created the record.

use std::collections::BTreeSet;

use crate::domain::{PaymentRecord, PaymentStatus};
use crate::model::{ModelError, ModelStore, ModelsExt};

/// Typed accessor over the payment collection.
pub struct PaymentLedger<'a, S> {
    store: &'a S,
}

impl<'a, S: ModelStore> PaymentLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The idempotency gate. Inserts a `recorded` entry for this charge
    /// reference, or returns the existing one untouched. The bool is
    /// `true` only for the caller that actually inserted.
    pub fn record_if_absent(
        &self,
        charge_ref: &str,
        account_id: &str,
        course_ids: &BTreeSet<String>,
        amount_cents: u64,
    ) -> Result<(PaymentRecord, bool), ModelError> {
        let record =
            PaymentRecord::recorded(charge_ref, account_id, course_ids.clone(), amount_cents);
        match self.store.docs::<PaymentRecord>().insert(&record) {
            Ok(inserted) => Ok((inserted.data, true)),
            Err(ModelError::AlreadyExists { .. }) => {
                let existing = self
                    .store
                    .docs::<PaymentRecord>()
                    .get(charge_ref)?
                    .ok_or_else(|| ModelError::not_found::<PaymentRecord>(charge_ref))?;
                Ok((existing.data, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Persist that this settlement holds a seat for `course_id`.
    /// Recorded immediately after each grant so a resumed run knows
    /// exactly which reservations already happened.
    pub fn mark_reserved(&self, charge_ref: &str, course_id: &str) -> Result<(), ModelError> {
        self.mutate_existing(charge_ref, &|record| {
            record.status == PaymentStatus::Recorded
                && record.reserved.insert(course_id.to_string())
        })
    }

    /// Forget reservations released during a rollback, so a later retry
    /// of the same charge starts those courses from scratch.
    pub fn unmark_reserved(
        &self,
        charge_ref: &str,
        course_ids: &[String],
    ) -> Result<(), ModelError> {
        self.mutate_existing(charge_ref, &|record| {
            let before = record.reserved.len();
            for id in course_ids {
                record.reserved.remove(id);
            }
            record.reserved.len() != before
        })
    }

    /// Transition `recorded -> applied`, signifying all downstream
    /// effects completed. Idempotent: marking an applied record again is
    /// a no-op.
    pub fn mark_applied(&self, charge_ref: &str) -> Result<(), ModelError> {
        self.mutate_existing(charge_ref, &|record| {
            if record.status == PaymentStatus::Recorded {
                record.status = PaymentStatus::Applied;
                true
            } else {
                false
            }
        })
    }

    /// Get a payment record by charge reference.
    pub fn get(&self, charge_ref: &str) -> Result<Option<PaymentRecord>, ModelError> {
        Ok(self
            .store
            .docs::<PaymentRecord>()
            .get(charge_ref)?
            .map(|v| v.data))
    }

    /// All payments for an account, newest first.
    pub fn history(&self, account_id: &str) -> Result<Vec<PaymentRecord>, ModelError> {
        let mut records: Vec<PaymentRecord> = self
            .store
            .docs::<PaymentRecord>()
            .find(&|record| record.account_id == account_id)?
            .into_iter()
            .map(|v| v.data)
            .collect();
        records.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| a.charge_ref.cmp(&b.charge_ref))
        });
        Ok(records)
    }

    fn mutate_existing(
        &self,
        charge_ref: &str,
        f: &dyn Fn(&mut PaymentRecord) -> bool,
    ) -> Result<(), ModelError> {
        self.store
            .docs::<PaymentRecord>()
            .mutate(charge_ref, f)?
            .ok_or_else(|| ModelError::not_found::<PaymentRecord>(charge_ref))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryModelStore;

    fn ids(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_record_is_new() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);

        let (record, was_new) = ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1"]), 1000)
            .unwrap();
        assert!(was_new);
        assert_eq!(record.status, PaymentStatus::Recorded);
        assert_eq!(record.course_ids, ids(&["c1"]));
    }

    #[test]
    fn second_record_returns_existing() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);

        ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1"]), 1000)
            .unwrap();
        let (record, was_new) = ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1"]), 1000)
            .unwrap();
        assert!(!was_new);
        assert_eq!(record.charge_ref, "ch_1");
    }

    #[test]
    fn reserved_set_survives_rereads() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);

        ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1", "c2"]), 2000)
            .unwrap();
        ledger.mark_reserved("ch_1", "c1").unwrap();

        let record = ledger.get("ch_1").unwrap().unwrap();
        assert_eq!(record.reserved, ids(&["c1"]));

        ledger.unmark_reserved("ch_1", &["c1".to_string()]).unwrap();
        let record = ledger.get("ch_1").unwrap().unwrap();
        assert!(record.reserved.is_empty());
    }

    #[test]
    fn mark_applied_is_idempotent() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);

        ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1"]), 1000)
            .unwrap();
        ledger.mark_applied("ch_1").unwrap();
        ledger.mark_applied("ch_1").unwrap();

        let record = ledger.get("ch_1").unwrap().unwrap();
        assert_eq!(record.status, PaymentStatus::Applied);
    }

    #[test]
    fn mark_applied_unknown_charge_fails() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);
        let err = ledger.mark_applied("ghost").unwrap_err();
        assert!(matches!(err, ModelError::NotFound { .. }));
    }

    #[test]
    fn history_is_per_account_newest_first() {
        let store = InMemoryModelStore::new();
        let ledger = PaymentLedger::new(&store);

        ledger
            .record_if_absent("ch_1", "acct-1", &ids(&["c1"]), 1000)
            .unwrap();
        ledger
            .record_if_absent("ch_2", "acct-1", &ids(&["c2"]), 2000)
            .unwrap();
        ledger
            .record_if_absent("ch_3", "acct-2", &ids(&["c3"]), 3000)
            .unwrap();

        let history = ledger.history("acct-1").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.account_id == "acct-1"));
        assert!(history[0].created_at_ms >= history[1].created_at_ms);
    }
}
