//! `account.get` — fetch an account document by id.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Account;
use crate::model::{ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "account.get";

#[derive(Deserialize)]
struct GetAccount {
    id: String,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["id"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let input = ctx.input::<GetAccount>()?;
    let account = ctx
        .store()
        .docs::<Account>()
        .get(&input.id)?
        .ok_or_else(|| HandlerError::NotFound(input.id.clone()))?;
    Ok(serde_json::to_value(account.data)?)
}
