//! Session variables from the request context.
//!
//! The identity subsystem verifies the bearer credential upstream and
//! forwards the result as headers; handlers trust these values as given.

use std::collections::HashMap;

/// Parsed session variables from the incoming request:
///
/// ```json
/// {
///   "x-account-id": "acct-42",
///   "x-account-role": "student"
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Session {
    variables: HashMap<String, String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from a map of variables.
    pub fn from_map(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    /// The verified account id (`x-account-id`).
    pub fn account_id(&self) -> Option<&str> {
        self.get("x-account-id")
    }

    /// The verified account role (`x-account-role`).
    pub fn role(&self) -> Option<&str> {
        self.get("x-account-role")
    }

    /// Get a session variable by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.as_str())
    }

    /// Set a session variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Convenience constructor for a session carrying just an account id.
    pub fn for_account(account_id: impl Into<String>) -> Self {
        let mut session = Session::new();
        session.set("x-account-id", account_id);
        session
    }
}
