//! service — Convention-based command dispatch for the backend.
//!
//! Each exposed operation is a command handler registered on a
//! [`Service`]. Handlers receive a [`Context`] with the parsed input,
//! the session variables the identity subsystem verified upstream, and
//! the document store.
//!
//! ## Handler Convention
//!
//! Each handler module exports:
//!
//! ```ignore
//! pub const COMMAND: &str = "cart.select";
//!
//! pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
//!     ctx.has_fields(&["course_id"])
//! }
//!
//! pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
//!     let account_id = ctx.account_id()?;
//!     let input = ctx.input::<SelectCourse>()?;
//!     // ...
//! }
//! ```
//!
//! The HTTP transport (feature `http`) maps `POST /:command` onto
//! dispatch, with request headers becoming the session.

mod context;
mod error;
mod session;
#[allow(clippy::module_inception)]
mod service;

pub use context::Context;
pub use error::HandlerError;
pub use service::Service;
pub use session::Session;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};

/// Register handler modules with a service using the convention pattern.
///
/// Each handler module must export `COMMAND`, `guard`, and `handle`.
///
/// # Example
/// ```ignore
/// let service = coursemarket::register_handlers!(
///     Service::new(InMemoryModelStore::new()),
///     handlers::cart_select,
///     handlers::settlement_run,
/// );
/// ```
#[macro_export]
macro_rules! register_handlers {
    ($service:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $service
        $(
            .command_guarded(
                $($seg)::+::COMMAND,
                $($seg)::+::guard,
                $($seg)::+::handle,
            )
        )+
    };
}
