//! `course.get` — fetch a course document by id.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Course;
use crate::model::{ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "course.get";

#[derive(Deserialize)]
struct GetCourse {
    id: String,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["id"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let input = ctx.input::<GetCourse>()?;
    let course = ctx
        .store()
        .docs::<Course>()
        .get(&input.id)?
        .ok_or_else(|| HandlerError::NotFound(input.id.clone()))?;
    Ok(serde_json::to_value(course.data)?)
}
