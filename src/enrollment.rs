//! Enrollment store: per-account set of paid-for course ids.
//!
//! Append-only per course per account. The insert-if-absent shape is the
//! retry guard: a settlement re-run that appends an already-enrolled
//! course sees `false` and treats it as success.

use std::collections::BTreeSet;

use crate::domain::EnrollmentRecord;
use crate::model::{ModelError, ModelStore, ModelsExt};

/// Typed accessor over the enrollment collection.
pub struct EnrollmentStore<'a, S> {
    store: &'a S,
}

impl<'a, S: ModelStore> EnrollmentStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Insert the course id and return true only if it was not already
    /// present. Returns false when already enrolled; callers treat that
    /// as success, not error.
    pub fn append_if_absent(&self, account_id: &str, course_id: &str) -> Result<bool, ModelError> {
        let mutation = self.store.docs::<EnrollmentRecord>().mutate_or_insert(
            account_id,
            &|| EnrollmentRecord::empty(account_id),
            &|record| record.course_ids.insert(course_id.to_string()),
        )?;
        Ok(mutation.applied)
    }

    /// The account's confirmed enrollments. Empty set when the account
    /// has never enrolled.
    pub fn get(&self, account_id: &str) -> Result<BTreeSet<String>, ModelError> {
        Ok(self
            .store
            .docs::<EnrollmentRecord>()
            .get(account_id)?
            .map(|v| v.data.course_ids)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryModelStore;

    #[test]
    fn first_append_returns_true() {
        let store = InMemoryModelStore::new();
        let enrollment = EnrollmentStore::new(&store);

        assert!(enrollment.append_if_absent("acct-1", "c1").unwrap());
        assert!(enrollment.get("acct-1").unwrap().contains("c1"));
    }

    #[test]
    fn duplicate_append_returns_false_not_error() {
        let store = InMemoryModelStore::new();
        let enrollment = EnrollmentStore::new(&store);

        assert!(enrollment.append_if_absent("acct-1", "c1").unwrap());
        assert!(!enrollment.append_if_absent("acct-1", "c1").unwrap());
        assert_eq!(enrollment.get("acct-1").unwrap().len(), 1);
    }

    #[test]
    fn missing_account_reads_empty() {
        let store = InMemoryModelStore::new();
        let enrollment = EnrollmentStore::new(&store);
        assert!(enrollment.get("nobody").unwrap().is_empty());
    }
}
