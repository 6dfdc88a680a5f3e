//! Cart store: per-account set of course ids awaiting purchase.
//!
//! Carts are partitioned by account id, so there is no cross-account
//! contention. Every mutation is idempotent, which is what lets the
//! settlement path re-run cart removal safely after a crash.

use std::collections::BTreeSet;

use crate::domain::CartEntry;
use crate::model::{ModelError, ModelStore, ModelsExt};

/// Typed accessor over the cart collection.
pub struct CartStore<'a, S> {
    store: &'a S,
}

impl<'a, S: ModelStore> CartStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Idempotent set-insert. Creates the cart document on first use.
    pub fn add(&self, account_id: &str, course_id: &str) -> Result<(), ModelError> {
        self.store.docs::<CartEntry>().mutate_or_insert(
            account_id,
            &|| CartEntry::empty(account_id),
            &|cart| cart.course_ids.insert(course_id.to_string()),
        )?;
        Ok(())
    }

    /// Idempotent set-delete. A missing cart or absent id is a no-op.
    pub fn remove(&self, account_id: &str, course_id: &str) -> Result<(), ModelError> {
        self.store
            .docs::<CartEntry>()
            .mutate(account_id, &|cart| cart.course_ids.remove(course_id))?;
        Ok(())
    }

    /// Atomically delete exactly the given ids, ignoring ones not
    /// present. One storage operation, so a crash cannot leave a cart
    /// half-cleared in a way a re-run would not fix.
    pub fn remove_subset(
        &self,
        account_id: &str,
        course_ids: &BTreeSet<String>,
    ) -> Result<(), ModelError> {
        self.store.docs::<CartEntry>().mutate(account_id, &|cart| {
            let before = cart.course_ids.len();
            for id in course_ids {
                cart.course_ids.remove(id);
            }
            cart.course_ids.len() != before
        })?;
        Ok(())
    }

    /// The account's current cart contents. Empty set when no cart
    /// document exists yet.
    pub fn get(&self, account_id: &str) -> Result<BTreeSet<String>, ModelError> {
        Ok(self
            .store
            .docs::<CartEntry>()
            .get(account_id)?
            .map(|v| v.data.course_ids)
            .unwrap_or_default())
    }
}
