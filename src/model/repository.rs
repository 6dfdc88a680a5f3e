//! ModelRepository - Typed accessor for document CRUD.

use std::marker::PhantomData;

use super::{Model, ModelError, ModelStore, Mutation, Versioned};

/// Typed repository wrapper for one document type.
pub struct ModelRepository<'a, S, M> {
    store: &'a S,
    _marker: PhantomData<M>,
}

impl<'a, S: ModelStore, M: Model> ModelRepository<'a, S, M> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get a document by id.
    pub fn get(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError> {
        self.store.get_model(id)
    }

    /// Upsert a document (insert or update, no version check).
    pub fn save(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        self.store.save_model(model)
    }

    /// Insert a new document. Fails if the id is taken.
    pub fn insert(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        self.store.insert_model(model)
    }

    /// Update an existing document with optimistic concurrency.
    pub fn update(&self, model: &M, expected_version: u64) -> Result<Versioned<M>, ModelError> {
        self.store.update_model(model, expected_version)
    }

    /// Atomically mutate an existing document.
    pub fn mutate(
        &self,
        id: &str,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Option<Mutation<M>>, ModelError> {
        self.store.mutate_model(id, f)
    }

    /// Atomically mutate a document, creating it via `init` when absent.
    pub fn mutate_or_insert(
        &self,
        id: &str,
        init: &dyn Fn() -> M,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Mutation<M>, ModelError> {
        self.store.mutate_or_insert_model(id, init, f)
    }

    /// Delete a document by id. Returns true if it existed.
    pub fn delete(&self, id: &str) -> Result<bool, ModelError> {
        self.store.delete_model::<M>(id)
    }

    /// Find documents matching a predicate.
    pub fn find(&self, predicate: &dyn Fn(&M) -> bool) -> Result<Vec<Versioned<M>>, ModelError> {
        self.store.find_models(predicate)
    }
}

/// Extension trait for typed document access on any ModelStore.
pub trait ModelsExt: ModelStore + Sized {
    /// Get a typed repository for one document type.
    fn docs<M: Model>(&self) -> ModelRepository<'_, Self, M> {
        ModelRepository::new(self)
    }
}

impl<S: ModelStore> ModelsExt for S {}
