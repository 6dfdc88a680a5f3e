//! `cart.deselect` — remove a course from the session account's cart.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::cart::CartStore;
use crate::model::ModelStore;
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "cart.deselect";

#[derive(Deserialize)]
struct DeselectCourse {
    course_id: String,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["course_id"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let input = ctx.input::<DeselectCourse>()?;

    let cart = CartStore::new(ctx.store());
    cart.remove(account_id, &input.course_id)?;
    Ok(json!({ "course_ids": cart.get(account_id)? }))
}
