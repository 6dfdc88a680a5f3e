//! Error types for command handlers.

use std::error::Error;
use std::fmt;

use crate::model::ModelError;
use crate::settlement::SettlementError;

/// Error type for command handler operations.
///
/// The taxonomy keeps retryable, caller-recoverable, and fatal failures
/// distinct so transports and operators can react differently.
#[derive(Debug)]
pub enum HandlerError {
    /// No handler registered for this command name.
    UnknownCommand(String),
    /// Payload decode / deserialization failed.
    DecodeFailed(String),
    /// Guard rejected the command (input validation failed).
    GuardRejected(String),
    /// Business logic rejected the command.
    Rejected(String),
    /// Document or resource not found.
    NotFound(String),
    /// Missing or invalid identity context.
    Unauthorized(String),
    /// Requested seats exceeded remaining capacity; names every full
    /// course. Caller-recoverable (retry with a reduced set / refund).
    Oversold { course_ids: Vec<String> },
    /// An idempotency key was reused with different arguments.
    Conflict(String),
    /// Internal invariant violation. Non-retryable; alerts an operator.
    Fault(String),
    /// Transient storage failure; the caller should retry.
    Unavailable(String),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::UnknownCommand(name) => write!(f, "unknown command: {}", name),
            HandlerError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
            HandlerError::GuardRejected(name) => write!(f, "guard rejected command: {}", name),
            HandlerError::Rejected(msg) => write!(f, "rejected: {}", msg),
            HandlerError::NotFound(id) => write!(f, "not found: {}", id),
            HandlerError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            HandlerError::Oversold { course_ids } => {
                write!(f, "sold out: {}", course_ids.join(", "))
            }
            HandlerError::Conflict(msg) => write!(f, "conflict: {}", msg),
            HandlerError::Fault(msg) => write!(f, "internal fault: {}", msg),
            HandlerError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl Error for HandlerError {}

impl From<ModelError> for HandlerError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound { collection, id } => {
                HandlerError::NotFound(format!("{}:{}", collection, id))
            }
            other => HandlerError::Unavailable(other.to_string()),
        }
    }
}

impl From<SettlementError> for HandlerError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::EmptyCourseSet => {
                HandlerError::Rejected("settlement requires at least one course".into())
            }
            SettlementError::ChargeRefMismatch { charge_ref } => HandlerError::Conflict(format!(
                "charge {} was recorded with different arguments",
                charge_ref
            )),
            SettlementError::Oversold { course_ids } => HandlerError::Oversold { course_ids },
            SettlementError::UnknownCourse(id) => HandlerError::NotFound(id),
            SettlementError::Inconsistency { .. } => HandlerError::Fault(err.to_string()),
            SettlementError::Storage(e) => HandlerError::Unavailable(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

impl HandlerError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::UnknownCommand(_) => 404,
            HandlerError::DecodeFailed(_) => 400,
            HandlerError::GuardRejected(_) => 400,
            HandlerError::Rejected(_) => 422,
            HandlerError::NotFound(_) => 404,
            HandlerError::Unauthorized(_) => 401,
            HandlerError::Oversold { .. } => 409,
            HandlerError::Conflict(_) => 409,
            HandlerError::Fault(_) => 500,
            HandlerError::Unavailable(_) => 503,
        }
    }
}
