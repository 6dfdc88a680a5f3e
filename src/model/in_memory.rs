//! InMemoryModelStore - HashMap-backed document store.
//!
//! The default backing for tests and single-process deployments. Stands
//! in for the document database; a remote implementation plugs in behind
//! the same [`ModelStore`] trait.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Model, ModelError, ModelStore, Mutation, Versioned};

/// Internal stored representation of a document.
struct StoredDoc {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`. Clone-friendly via Arc: clones share
/// storage. All mutations run under the write guard, which is what makes
/// `mutate_model` a true test-and-set rather than a read-then-write.
#[derive(Clone)]
pub struct InMemoryModelStore {
    storage: Arc<RwLock<HashMap<String, StoredDoc>>>,
}

impl Default for InMemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryModelStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn encode<M: Model>(model: &M) -> Result<Vec<u8>, ModelError> {
        serde_json::to_vec(model).map_err(|e| ModelError::Serde(e.to_string()))
    }

    fn decode<M: Model>(bytes: &[u8]) -> Result<M, ModelError> {
        serde_json::from_slice(bytes).map_err(|e| ModelError::Serde(e.to_string()))
    }
}

impl ModelStore for InMemoryModelStore {
    fn get_model<M: Model>(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        let storage = self
            .storage
            .read()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        match storage.get(&key) {
            Some(stored) => Ok(Some(Versioned {
                data: Self::decode(&stored.bytes)?,
                version: stored.version,
            })),
            None => Ok(None),
        }
    }

    fn save_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        let key = Self::make_key(M::COLLECTION, model.id());
        let bytes = Self::encode(model)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        let new_version = storage.get(&key).map(|s| s.version + 1).unwrap_or(1);
        storage.insert(
            key,
            StoredDoc {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: model.clone(),
            version: new_version,
        })
    }

    fn insert_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError> {
        let key = Self::make_key(M::COLLECTION, model.id());
        let bytes = Self::encode(model)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        if storage.contains_key(&key) {
            return Err(ModelError::AlreadyExists {
                collection: M::COLLECTION.to_string(),
                id: model.id().to_string(),
            });
        }

        storage.insert(key, StoredDoc { bytes, version: 1 });

        Ok(Versioned {
            data: model.clone(),
            version: 1,
        })
    }

    fn update_model<M: Model>(
        &self,
        model: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, ModelError> {
        let key = Self::make_key(M::COLLECTION, model.id());
        let bytes = Self::encode(model)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        let actual_version = storage
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| ModelError::not_found::<M>(model.id()))?;

        if actual_version != expected_version {
            return Err(ModelError::VersionConflict {
                collection: M::COLLECTION.to_string(),
                id: model.id().to_string(),
                expected: expected_version,
                actual: actual_version,
            });
        }

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredDoc {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: model.clone(),
            version: new_version,
        })
    }

    fn mutate_model<M: Model>(
        &self,
        id: &str,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Option<Mutation<M>>, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        let stored = match storage.get_mut(&key) {
            Some(stored) => stored,
            None => return Ok(None),
        };

        let mut data: M = Self::decode(&stored.bytes)?;
        if !f(&mut data) {
            return Ok(Some(Mutation {
                applied: false,
                model: Versioned {
                    data,
                    version: stored.version,
                },
            }));
        }

        stored.bytes = Self::encode(&data)?;
        stored.version += 1;
        Ok(Some(Mutation {
            applied: true,
            model: Versioned {
                data,
                version: stored.version,
            },
        }))
    }

    fn mutate_or_insert_model<M: Model>(
        &self,
        id: &str,
        init: &dyn Fn() -> M,
        f: &dyn Fn(&mut M) -> bool,
    ) -> Result<Mutation<M>, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        let (mut data, version) = match storage.get(&key) {
            Some(stored) => (Self::decode::<M>(&stored.bytes)?, stored.version),
            None => (init(), 0),
        };

        if !f(&mut data) {
            return Ok(Mutation {
                applied: false,
                model: Versioned { data, version },
            });
        }

        let bytes = Self::encode(&data)?;
        let new_version = version + 1;
        storage.insert(
            key,
            StoredDoc {
                bytes,
                version: new_version,
            },
        );
        Ok(Mutation {
            applied: true,
            model: Versioned {
                data,
                version: new_version,
            },
        })
    }

    fn delete_model<M: Model>(&self, id: &str) -> Result<bool, ModelError> {
        let key = Self::make_key(M::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        Ok(storage.remove(&key).is_some())
    }

    fn find_models<M: Model>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, ModelError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", M::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in storage.iter() {
            if key.starts_with(&prefix) {
                if let Ok(data) = Self::decode::<M>(&stored.bytes) {
                    if predicate(&data) {
                        results.push(Versioned {
                            data,
                            version: stored.version,
                        });
                    }
                }
            }
        }

        Ok(results)
    }
}
