//! `account.upsert` — create an account on first sight of an email,
//! return the existing one otherwise. New accounts start as students;
//! role changes are an identity-subsystem concern.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Account, Role};
use crate::model::{ModelError, ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "account.upsert";

#[derive(Deserialize)]
struct UpsertAccount {
    email: String,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["email"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let input = ctx.input::<UpsertAccount>()?;
    let accounts = ctx.store().docs::<Account>();

    if let Some(existing) = accounts.find(&|a| a.email == input.email)?.into_iter().next() {
        return Ok(serde_json::to_value(existing.data)?);
    }

    let account = Account {
        id: account_id_for(&input.email),
        email: input.email.clone(),
        role: Role::Student,
    };
    match accounts.insert(&account) {
        Ok(inserted) => Ok(serde_json::to_value(inserted.data)?),
        // Lost a race with a concurrent upsert for the same email.
        Err(ModelError::AlreadyExists { .. }) => {
            let existing = accounts
                .get(&account.id)?
                .ok_or_else(|| HandlerError::NotFound(account.id.clone()))?;
            Ok(serde_json::to_value(existing.data)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deterministic account id derived from the email, so upserts for the
/// same email always land on the same document.
fn account_id_for(email: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    email.hash(&mut hasher);
    format!("acct-{:016x}", hasher.finish())
}
