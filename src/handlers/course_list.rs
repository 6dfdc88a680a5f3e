//! `course.list` — all approved courses, ascending id order.

use serde_json::Value;

use crate::domain::Course;
use crate::model::{ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "course.list";

pub fn guard<S: ModelStore>(_ctx: &Context<S>) -> bool {
    true
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let mut courses: Vec<Course> = ctx
        .store()
        .docs::<Course>()
        .find(&|c| c.approved)?
        .into_iter()
        .map(|v| v.data)
        .collect();
    courses.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(serde_json::to_value(courses)?)
}
