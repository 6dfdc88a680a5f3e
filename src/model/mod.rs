//! Document-store abstraction backing every collection in the backend.
//!
//! Each stored type implements [`Model`] with a collection name and an id.
//! [`ModelStore`] is the pluggable storage trait; [`InMemoryModelStore`]
//! is the default backing. The settlement path leans on two guarantees
//! this layer provides:
//!
//! - `insert_model` is insert-if-absent in one storage operation (the
//!   payment ledger's idempotency gate),
//! - `mutate_model` applies a closure to a document inside a single
//!   storage mutation (the inventory ledger's check-and-reserve), so
//!   concurrent callers never race a read-then-write.
//!
//! ## Example
//!
//! ```ignore
//! use coursemarket::model::{InMemoryModelStore, Model, ModelsExt};
//!
//! let store = InMemoryModelStore::new();
//! store.docs::<Course>().save(&course)?;
//! let loaded = store.docs::<Course>().get("course-1")?;
//! ```

mod in_memory;
mod repository;
mod store;

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Trait for types stored as documents.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection name for this type (e.g. "courses", "payments").
    /// Maps to a table in SQL, a collection in a document database,
    /// a key prefix in KV stores.
    const COLLECTION: &'static str;

    /// Unique identifier of this document within its collection.
    fn id(&self) -> &str;
}

/// A document paired with its storage version, for optimistic concurrency.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Result of an atomic mutate call: whether the closure committed, plus
/// the document as stored afterwards (unchanged when not applied).
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub applied: bool,
    pub model: Versioned<T>,
}

/// Error type for model store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Insert attempted for an id that already exists.
    AlreadyExists { collection: String, id: String },
    /// Optimistic concurrency conflict on a versioned update.
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Document not found.
    NotFound { collection: String, id: String },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error. Transient: callers may retry the whole
    /// operation that hit it.
    Storage(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::AlreadyExists { collection, id } => {
                write!(f, "document already exists: {}:{}", collection, id)
            }
            ModelError::VersionConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "version conflict on {}:{} (expected {}, actual {})",
                collection, id, expected, actual
            ),
            ModelError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            ModelError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            ModelError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

impl ModelError {
    pub(crate) fn not_found<M: Model>(id: &str) -> Self {
        ModelError::NotFound {
            collection: M::COLLECTION.to_string(),
            id: id.to_string(),
        }
    }
}

pub use in_memory::InMemoryModelStore;
pub use repository::{ModelRepository, ModelsExt};
pub use store::ModelStore;
