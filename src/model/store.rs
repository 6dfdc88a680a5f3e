//! ModelStore - Abstract document storage for the backend's collections.

use super::{Model, ModelError, Mutation, Versioned};

/// Abstract document storage.
///
/// Implementations must make every method a single storage operation:
/// in particular `insert_model` and the two `mutate_*` methods are the
/// atomic primitives the settlement path builds its idempotency and
/// no-oversell guarantees on.
pub trait ModelStore: Send + Sync {
    /// Get a document by id. Returns None if not found.
    fn get_model<M: Model>(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError>;

    /// Upsert a document (insert or update, no version check).
    fn save_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError>;

    /// Insert a new document. Fails with `AlreadyExists` if the id is taken.
    fn insert_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError>;

    /// Update an existing document with optimistic concurrency control.
    fn update_model<M: Model>(
        &self,
        model: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, ModelError>;

    /// Apply `f` to the stored document in one atomic storage operation.
    ///
    /// Returns `None` if no document with this id exists. When `f`
    /// returns `false` the document is left untouched and
    /// `Mutation::applied` is `false`. Callers must not rely on how many
    /// times `f` runs; it may be retried internally.
    fn mutate_model<M: Model>(
        &self,
        id: &str,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Option<Mutation<M>>, ModelError>;

    /// Like `mutate_model`, but creates the document from `init` when it
    /// does not exist yet. Creation and mutation happen in the same
    /// atomic step.
    fn mutate_or_insert_model<M: Model>(
        &self,
        id: &str,
        init: &dyn Fn() -> M,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Mutation<M>, ModelError>;

    /// Delete a document by id. Returns true if it existed.
    fn delete_model<M: Model>(&self, id: &str) -> Result<bool, ModelError>;

    /// Find documents matching a predicate.
    fn find_models<M: Model>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, ModelError>;
}
