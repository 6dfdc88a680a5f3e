//! `cart.select` — add a course to the session account's cart.
//!
//! Rejects courses the account already paid for: a course id never sits
//! in both the cart and the enrollment record.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::cart::CartStore;
use crate::domain::Course;
use crate::enrollment::EnrollmentStore;
use crate::model::{ModelStore, ModelsExt};
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "cart.select";

#[derive(Deserialize)]
struct SelectCourse {
    course_id: String,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["course_id"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let input = ctx.input::<SelectCourse>()?;

    let course = ctx
        .store()
        .docs::<Course>()
        .get(&input.course_id)?
        .ok_or_else(|| HandlerError::NotFound(input.course_id.clone()))?;
    if !course.data.approved {
        return Err(HandlerError::Rejected(format!(
            "course {} is not open for enrollment",
            input.course_id
        )));
    }

    let enrollment = EnrollmentStore::new(ctx.store());
    if enrollment.get(account_id)?.contains(&input.course_id) {
        return Err(HandlerError::Rejected(format!(
            "already enrolled in course {}",
            input.course_id
        )));
    }

    let cart = CartStore::new(ctx.store());
    cart.add(account_id, &input.course_id)?;
    Ok(json!({ "course_ids": cart.get(account_id)? }))
}
