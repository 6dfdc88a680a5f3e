//! coursemarket — course marketplace backend.
//!
//! Students browse and pay to enroll in instructor-authored courses.
//! Most of the surface is thin CRUD over a document store; the part with
//! real machinery is [`settlement`]: converting a paid cart into seat
//! decrements, a durable payment ledger entry, and confirmed enrollment,
//! exactly once per charge, without multi-document atomicity from the
//! store.
//!
//! ## Layout
//!
//! - [`model`] — pluggable document store with atomic single-document
//!   mutation primitives.
//! - [`domain`] — the stored document types.
//! - Stores: [`inventory`], [`cart`], [`enrollment`], [`payments`] —
//!   typed accessors over the collections.
//! - [`settlement`] — the resumable settlement protocol.
//! - [`service`] + [`handlers`] — command dispatch and the exposed
//!   operations; HTTP transport behind the `http` feature.

pub mod cart;
pub mod domain;
pub mod enrollment;
pub mod handlers;
pub mod inventory;
pub mod model;
pub mod payments;
pub mod service;
pub mod settlement;

pub use cart::CartStore;
pub use domain::{Account, CartEntry, Course, EnrollmentRecord, PaymentRecord, PaymentStatus, Role};
pub use enrollment::EnrollmentStore;
pub use inventory::{InventoryError, InventoryLedger};
pub use model::{InMemoryModelStore, Model, ModelError, ModelStore, ModelsExt};
pub use payments::PaymentLedger;
pub use service::{Context, HandlerError, Service, Session};
pub use settlement::{SettlementError, SettlementOrchestrator, SettlementReceipt};
