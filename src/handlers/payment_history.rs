//! `payment.history` — the session account's payments, newest first.

use serde_json::Value;

use crate::model::ModelStore;
use crate::payments::PaymentLedger;
use crate::service::{Context, HandlerError};

pub const COMMAND: &str = "payment.history";

pub fn guard<S: ModelStore>(_ctx: &Context<S>) -> bool {
    true
}

pub fn handle<S: ModelStore>(ctx: &Context<S>) -> Result<Value, HandlerError> {
    let account_id = ctx.account_id()?;
    let ledger = PaymentLedger::new(ctx.store());
    Ok(serde_json::to_value(ledger.history(account_id)?)?)
}
