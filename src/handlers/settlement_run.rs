//! `settlement.run` — settle a captured charge for the session account.
//!
//! The payment gateway has already captured `amount_cents` and issued
//! `charge_ref` before this command runs; this handler never touches the
//! charge itself. Safe to retry with the same `charge_ref` on timeout.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::ModelStore;
use crate::service::{Context, HandlerError};
use crate::settlement::SettlementOrchestrator;

pub const COMMAND: &str = "settlement.run";

#[derive(Deserialize)]
struct RunSettlement {
    charge_ref: String,
    course_ids: Vec<String>,
    amount_cents: u64,
}

pub fn guard<S: ModelStore>(ctx: &Context<S>) -> bool {
    ctx.has_fields(&["charge_ref", "course_ids", "amount_cents"])
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let input = ctx.input::<RunSettlement>()?;
    let course_ids: BTreeSet<String> = input.course_ids.into_iter().collect();

    let orchestrator = SettlementOrchestrator::new(ctx.store());
    let receipt = orchestrator.settle(
        &input.charge_ref,
        account_id,
        &course_ids,
        input.amount_cents,
    )?;

    Ok(json!({
        "status": if receipt.replayed { "replayed" } else { "applied" },
        "courses": receipt.courses,
    }))
}
