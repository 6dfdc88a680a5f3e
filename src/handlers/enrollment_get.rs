//! `enrollment.get` — the session account's confirmed enrollments.

use serde_json::{json, Value};

use crate::enrollment::EnrollmentStore;
use crate::model::ModelStore;
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "enrollment.get";

pub fn guard<S: ModelStore>(_ctx: &Context<S>) -> bool {
    true
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let enrollment = EnrollmentStore::new(ctx.store());
    Ok(json!({ "course_ids": enrollment.get(account_id)? }))
}
