//! Settlement orchestrator: converts a paid cart into confirmed
//! enrollment, seat decrements, and a durable payment ledger entry —
//! exactly once per charge, with no multi-document transaction to lean on.
//!
//! The protocol is a sequence of individually idempotent steps keyed by
//! the external charge reference:
//!
//! 1. Record the payment (insert-if-absent). An `applied` record replays
//!    the prior result with zero side effects; a `recorded` one resumes.
//! 2. Reserve one seat per course, ascending id order, persisting each
//!    grant in the record's `reserved` set. Any sold-out course rolls
//!    back this pass's grants and fails with `Oversold`.
//! 3. Append enrollments (tolerant of duplicates), then clear the
//!    settled ids from the cart in one batched removal.
//! 4. Mark the payment `applied`.
//!
//! A crash between any two steps is safe: re-running with the same
//! charge reference short-circuits completed work and picks up where the
//! previous attempt stopped.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{info, warn};

use crate::cart::CartStore;
use crate::domain::{Course, PaymentStatus};
use crate::enrollment::EnrollmentStore;
use crate::inventory::{InventoryError, InventoryLedger};
use crate::model::{ModelError, ModelStore, ModelsExt};
use crate::payments::PaymentLedger;

/// Error type for settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// The course set was empty.
    EmptyCourseSet,
    /// A charge reference was replayed with a different account or
    /// course set than it was first recorded with.
    ChargeRefMismatch { charge_ref: String },
    /// One or more courses had no seats left. Names every full course so
    /// the client can re-offer the rest of the cart. Seats taken during
    /// the failed pass have been released; the charge itself is the
    /// caller's refund obligation.
    Oversold { course_ids: Vec<String> },
    /// A course id with no course document behind it.
    UnknownCourse(String),
    /// Fatal inventory invariant violation. Non-retryable; needs an
    /// operator.
    Inconsistency { course_id: String, detail: String },
    /// Transient storage failure. Retry the whole call with the same
    /// charge reference.
    Storage(ModelError),
}

impl fmt::Display for SettlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementError::EmptyCourseSet => write!(f, "settlement requires at least one course"),
            SettlementError::ChargeRefMismatch { charge_ref } => {
                write!(f, "charge {} was recorded with different arguments", charge_ref)
            }
            SettlementError::Oversold { course_ids } => {
                write!(f, "sold out: {}", course_ids.join(", "))
            }
            SettlementError::UnknownCourse(id) => write!(f, "unknown course: {}", id),
            SettlementError::Inconsistency { course_id, detail } => {
                write!(f, "inventory inconsistency on course {}: {}", course_id, detail)
            }
            SettlementError::Storage(e) => write!(f, "settlement storage error: {}", e),
        }
    }
}

impl std::error::Error for SettlementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettlementError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for SettlementError {
    fn from(err: ModelError) -> Self {
        SettlementError::Storage(err)
    }
}

impl From<InventoryError> for SettlementError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::UnknownCourse(id) => SettlementError::UnknownCourse(id),
            InventoryError::Inconsistency { course_id, detail } => {
                SettlementError::Inconsistency { course_id, detail }
            }
            InventoryError::Storage(e) => SettlementError::Storage(e),
        }
    }
}

/// Outcome of a successful settlement: the updated course documents,
/// plus whether this call was an idempotent replay of an earlier one.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub replayed: bool,
    pub courses: Vec<Course>,
}

/// Drives the four stores through the settlement protocol. The only
/// writer of seat counts and enrollment records.
pub struct SettlementOrchestrator<'a, S> {
    store: &'a S,
}

impl<'a, S: ModelStore> SettlementOrchestrator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Settle a completed charge: `charge_ref` is the gateway's globally
    /// unique reference for a captured payment of `amount_cents` by
    /// `account_id` for `course_ids`.
    ///
    /// Safe to call again with the same `charge_ref` after any failure
    /// or timeout; a finished settlement replays its result.
    pub fn settle(
        &self,
        charge_ref: &str,
        account_id: &str,
        course_ids: &BTreeSet<String>,
        amount_cents: u64,
    ) -> Result<SettlementReceipt, SettlementError> {
        if course_ids.is_empty() {
            return Err(SettlementError::EmptyCourseSet);
        }

        let payments = PaymentLedger::new(self.store);
        let (record, was_new) =
            payments.record_if_absent(charge_ref, account_id, course_ids, amount_cents)?;

        if !was_new {
            if record.account_id != account_id
                || &record.course_ids != course_ids
                || record.amount_cents != amount_cents
            {
                return Err(SettlementError::ChargeRefMismatch {
                    charge_ref: charge_ref.to_string(),
                });
            }
            if record.status == PaymentStatus::Applied {
                info!(charge_ref, account_id, "settlement replayed");
                return Ok(SettlementReceipt {
                    replayed: true,
                    courses: self.load_courses(course_ids)?,
                });
            }
            // recorded but not applied: resume the interrupted attempt.
        }

        let inventory = InventoryLedger::new(self.store);
        let enrollment = EnrollmentStore::new(self.store);

        // Reservations that already happened: persisted grants from a
        // prior pass, plus courses the account is already enrolled in.
        let enrolled = enrollment.get(account_id)?;
        let already_held: BTreeSet<&String> = course_ids
            .iter()
            .filter(|id| record.reserved.contains(*id) || enrolled.contains(*id))
            .collect();

        // Ascending id order bounds contention and rules out cyclic
        // waits in per-row-locking backends.
        let mut granted: Vec<String> = Vec::new();
        let mut full: Vec<String> = Vec::new();
        for course_id in course_ids {
            if already_held.contains(course_id) {
                continue;
            }
            match inventory.try_reserve(course_id, 1) {
                Ok(true) => {
                    payments.mark_reserved(charge_ref, course_id)?;
                    granted.push(course_id.clone());
                }
                Ok(false) => full.push(course_id.clone()),
                Err(e) => {
                    // Unknown course: undo this pass before reporting,
                    // same as the oversold path. Transient/fault errors
                    // leave state in place for a resume.
                    if matches!(e, InventoryError::UnknownCourse(_)) {
                        self.roll_back(&inventory, &payments, charge_ref, &granted)?;
                    }
                    return Err(e.into());
                }
            }
        }

        if !full.is_empty() {
            self.roll_back(&inventory, &payments, charge_ref, &granted)?;
            warn!(charge_ref, account_id, full = ?full, "settlement oversold");
            return Err(SettlementError::Oversold { course_ids: full });
        }

        for course_id in course_ids {
            // false means already enrolled; fine on a resumed run.
            enrollment.append_if_absent(account_id, course_id)?;
        }

        let cart = CartStore::new(self.store);
        cart.remove_subset(account_id, course_ids)?;

        payments.mark_applied(charge_ref)?;
        info!(charge_ref, account_id, courses = course_ids.len(), "settlement applied");

        Ok(SettlementReceipt {
            replayed: false,
            courses: self.load_courses(course_ids)?,
        })
    }

    /// Release every seat granted in this pass and drop the matching
    /// reserved markers, leaving the payment record at `recorded`.
    fn roll_back(
        &self,
        inventory: &InventoryLedger<'a, S>,
        payments: &PaymentLedger<'a, S>,
        charge_ref: &str,
        granted: &[String],
    ) -> Result<(), SettlementError> {
        for course_id in granted {
            inventory.release(course_id, 1)?;
        }
        payments.unmark_reserved(charge_ref, granted)?;
        Ok(())
    }

    /// Updated course documents in ascending id order.
    fn load_courses(&self, course_ids: &BTreeSet<String>) -> Result<Vec<Course>, SettlementError> {
        let mut courses = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            let course = self
                .store
                .docs::<Course>()
                .get(id)?
                .ok_or_else(|| SettlementError::UnknownCourse(id.clone()))?;
            courses.push(course.data);
        }
        Ok(courses)
    }
}
