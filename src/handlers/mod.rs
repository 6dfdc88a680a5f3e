//! Command handlers, one module per exposed operation.
//!
//! Every module follows the handler convention (`COMMAND`, `guard`,
//! `handle`) and is wired up by [`service_over`]. Identity verification,
//! role gating, catalog authoring, and card capture all live upstream;
//! handlers receive a pre-authorized account id in the session and never
//! branch on role.

pub mod account_get;
pub mod account_upsert;
pub mod cart_deselect;
pub mod cart_get;
pub mod cart_select;
pub mod course_get;
pub mod course_list;
pub mod enrollment_get;
pub mod instructor_list;
pub mod payment_history;
pub mod settlement_run;

use crate::model::{InMemoryModelStore, ModelStore};
use crate::register_handlers;
use crate::service::Service;

/// Build a service with every handler registered over the given store.
pub fn service_over<S: ModelStore + 'static>(store: S) -> Service<S> {
    register_handlers!(
        Service::new(store),
        account_upsert,
        account_get,
        instructor_list,
        course_get,
        course_list,
        cart_select,
        cart_deselect,
        cart_get,
        enrollment_get,
        payment_history,
        settlement_run,
    )
}

/// A fully wired service over a fresh in-memory store.
pub fn default_service() -> Service<InMemoryModelStore> {
    service_over(InMemoryModelStore::new())
}
