//! `instructor.list` — all accounts with the instructor role.

use serde_json::Value;

use crate::domain::{Account, Role};
use crate::model::{ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "instructor.list";

pub fn guard<S: ModelStore>(_ctx: &Context<S>) -> bool {
    true
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let mut instructors: Vec<Account> = ctx
        .store()
        .docs::<Account>()
        .find(&|a| a.role == Role::Instructor)?
        .into_iter()
        .map(|v| v.data)
        .collect();
    instructors.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(serde_json::to_value(instructors)?)
}
