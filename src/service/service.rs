//! Service — command handler registry and dispatch.

use std::collections::HashMap;

use serde_json::Value;

use super::context::Context;
use super::error::HandlerError;
use super::session::Session;

/// A registered command handler with optional guard.
struct CommandHandler<S> {
    guard: Option<Box<dyn Fn(&Context<S>) -> bool + Send + Sync>>,
    handle: Box<dyn Fn(&Context<S>) -> Result<Value, HandlerError> + Send + Sync>,
}

/// Routes commands to handler functions over a shared document store.
///
/// Generic over `S`, the store type. Built with the builder pattern:
///
/// ```ignore
/// let service = Service::new(InMemoryModelStore::new())
///     .command("cart.get", |ctx| { /* ... */ });
/// ```
pub struct Service<S> {
    store: S,
    handlers: HashMap<String, CommandHandler<S>>,
}

impl<S: Send + Sync + 'static> Service<S> {
    /// Create a new service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Register a command handler. Returns `self` for chaining.
    pub fn command<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&Context<S>) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            CommandHandler {
                guard: None,
                handle: Box::new(handler),
            },
        );
        self
    }

    /// Register a command handler with a guard function.
    ///
    /// The guard runs before the handler; returning `false` rejects the
    /// command with `HandlerError::GuardRejected`.
    pub fn command_guarded<G, F>(mut self, name: &str, guard: G, handler: F) -> Self
    where
        G: Fn(&Context<S>) -> bool + Send + Sync + 'static,
        F: Fn(&Context<S>) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            CommandHandler {
                guard: Some(Box::new(guard)),
                handle: Box::new(handler),
            },
        );
        self
    }

    /// Dispatch a command by name.
    pub fn dispatch(
        &self,
        command: &str,
        input: Value,
        session: Session,
    ) -> Result<Value, HandlerError> {
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| HandlerError::UnknownCommand(command.to_string()))?;

        let ctx = Context::new(command.to_string(), input, session, &self.store);

        if let Some(guard) = &handler.guard {
            if !guard(&ctx) {
                return Err(HandlerError::GuardRejected(command.to_string()));
            }
        }

        (handler.handle)(&ctx)
    }

    /// Names of all registered commands.
    pub fn commands(&self) -> Vec<&str> {
        self.handlers.keys().map(|k| k.as_str()).collect()
    }

    /// The underlying document store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
