//! `cart.get` — the session account's cart contents.

use serde_json::{json, Value};

use crate::cart::CartStore;
use crate::model::ModelStore;
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "cart.get";

pub fn guard<S: ModelStore>(_ctx: &Context<S>) -> bool {
    true
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let cart = CartStore::new(ctx.store());
    Ok(json!({ "course_ids": cart.get(account_id)? }))
}
