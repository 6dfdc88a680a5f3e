//! Context passed to command handlers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HandlerError;
use super::session::Session;

/// The context passed to every command handler.
///
/// Generic over `S`, the document store type the service is configured
/// with. Handlers reach storage through `ctx.store()`.
pub struct Context<'a, S> {
    command_name: String,
    input: Value,
    session: Session,
    store: &'a S,
}

impl<'a, S> Context<'a, S> {
    pub(crate) fn new(command_name: String, input: Value, session: Session, store: &'a S) -> Self {
        Self {
            command_name,
            input,
            session,
            store,
        }
    }

    /// Deserialize the input payload into a typed struct.
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.input.clone())
            .map_err(|e| HandlerError::DecodeFailed(e.to_string()))
    }

    /// Get the raw JSON input.
    pub fn raw_input(&self) -> &Value {
        &self.input
    }

    /// Get the command name.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Get the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The verified account id from the session. `Unauthorized` if absent.
    pub fn account_id(&self) -> Result<&str, HandlerError> {
        self.session
            .account_id()
            .ok_or_else(|| HandlerError::Unauthorized("missing account id in session".into()))
    }

    /// Get a reference to the document store.
    pub fn store(&self) -> &S {
        self.store
    }

    /// Check if the raw input contains a field.
    pub fn has_field(&self, field: &str) -> bool {
        self.input.get(field).is_some()
    }

    /// Check if the raw input contains all specified fields.
    pub fn has_fields(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.has_field(f))
    }
}
