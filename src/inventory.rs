//! Inventory ledger: authoritative seat counts per course.
//!
//! Every mutation here is a single atomic storage operation via
//! `mutate_model`, so two callers racing for the last seat of the same
//! course serialize at the store and exactly one wins. No in-process
//! lock is held across a storage call.

use std::fmt;

use tracing::error;

use crate::domain::Course;
use crate::model::{ModelError, ModelStore, ModelsExt};

/// Error type for inventory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// No course document with this id.
    UnknownCourse(String),
    /// A release would push counts outside `0..=capacity`. Fatal
    /// consistency fault; never silently clamped.
    Inconsistency { course_id: String, detail: String },
    /// Underlying storage failed.
    Storage(ModelError),
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::UnknownCourse(id) => write!(f, "unknown course: {}", id),
            InventoryError::Inconsistency { course_id, detail } => {
                write!(f, "inventory inconsistency on course {}: {}", course_id, detail)
            }
            InventoryError::Storage(e) => write!(f, "inventory storage error: {}", e),
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for InventoryError {
    fn from(err: ModelError) -> Self {
        InventoryError::Storage(err)
    }
}

/// Typed accessor over the course collection's seat counts.
pub struct InventoryLedger<'a, S> {
    store: &'a S,
}

impl<'a, S: ModelStore> InventoryLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Atomically reserve `n` seats: if `seats_available >= n`, decrement
    /// it and increment `enrolled_count` in the same storage operation
    /// and return true. Otherwise change nothing and return false.
    pub fn try_reserve(&self, course_id: &str, n: u32) -> Result<bool, InventoryError> {
        let mutation = self
            .store
            .docs::<Course>()
            .mutate(course_id, &|course| {
                if course.seats_available >= n {
                    course.seats_available -= n;
                    course.enrolled_count += n;
                    true
                } else {
                    false
                }
            })?
            .ok_or_else(|| InventoryError::UnknownCourse(course_id.to_string()))?;

        Ok(mutation.applied)
    }

    /// Compensating release of `n` seats, used only when rolling back a
    /// partially failed settlement. A release that would exceed capacity
    /// or drive `enrolled_count` negative is refused and surfaced as an
    /// `Inconsistency` fault.
    pub fn release(&self, course_id: &str, n: u32) -> Result<(), InventoryError> {
        let mutation = self
            .store
            .docs::<Course>()
            .mutate(course_id, &|course| {
                if course.seats_available + n <= course.capacity && course.enrolled_count >= n {
                    course.seats_available += n;
                    course.enrolled_count -= n;
                    true
                } else {
                    false
                }
            })?
            .ok_or_else(|| InventoryError::UnknownCourse(course_id.to_string()))?;

        if !mutation.applied {
            let course = &mutation.model.data;
            let detail = format!(
                "release of {} seats refused (seats_available={}, enrolled_count={}, capacity={})",
                n, course.seats_available, course.enrolled_count, course.capacity
            );
            error!(course_id, %detail, "inventory inconsistency");
            return Err(InventoryError::Inconsistency {
                course_id: course_id.to_string(),
                detail,
            });
        }
        Ok(())
    }
}
