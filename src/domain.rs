//! Stored document types: accounts, courses, carts, enrollments, payments.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Account role, assigned by the identity subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

/// An account. Owned by the identity subsystem; the settlement core only
/// reads `id` and `role`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl Model for Account {
    const COLLECTION: &'static str = "accounts";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A course document. `capacity` is fixed at creation; `seats_available`
/// and `enrolled_count` are written only by the settlement path.
///
/// Invariant once approved and open for enrollment:
/// `seats_available + enrolled_count == capacity`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub instructor_id: String,
    pub price_cents: u64,
    pub capacity: u32,
    pub seats_available: u32,
    pub enrolled_count: u32,
    pub approved: bool,
}

impl Course {
    /// A newly approved course with all seats open.
    pub fn open(id: impl Into<String>, instructor_id: impl Into<String>, price_cents: u64, capacity: u32) -> Self {
        Course {
            id: id.into(),
            instructor_id: instructor_id.into(),
            price_cents,
            capacity,
            seats_available: capacity,
            enrolled_count: 0,
            approved: true,
        }
    }
}

impl Model for Course {
    const COLLECTION: &'static str = "courses";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-account cart: the course ids the account intends to purchase.
/// Keyed by account id. Never holds an id that is also in the account's
/// enrollment record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub account_id: String,
    pub course_ids: BTreeSet<String>,
}

impl CartEntry {
    pub fn empty(account_id: impl Into<String>) -> Self {
        CartEntry {
            account_id: account_id.into(),
            course_ids: BTreeSet::new(),
        }
    }
}

impl Model for CartEntry {
    const COLLECTION: &'static str = "carts";
    fn id(&self) -> &str {
        &self.account_id
    }
}

/// Per-account enrollment record: the course ids the account has paid
/// for. Append-only; entries are never removed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub account_id: String,
    pub course_ids: BTreeSet<String>,
}

impl EnrollmentRecord {
    pub fn empty(account_id: impl Into<String>) -> Self {
        EnrollmentRecord {
            account_id: account_id.into(),
            course_ids: BTreeSet::new(),
        }
    }
}

impl Model for EnrollmentRecord {
    const COLLECTION: &'static str = "enrollments";
    fn id(&self) -> &str {
        &self.account_id
    }
}

/// Settlement status of a payment record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The charge is recorded but downstream effects may be incomplete.
    Recorded,
    /// Inventory, enrollment, and cart removal have all completed.
    Applied,
}

/// Durable record of a completed charge. Keyed by the external charge
/// reference, which doubles as the settlement idempotency key.
///
/// Immutable once written except for the `recorded -> applied` status
/// transition and growth of `reserved` while still `recorded`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub charge_ref: String,
    pub account_id: String,
    pub course_ids: BTreeSet<String>,
    pub amount_cents: u64,
    pub created_at_ms: u64,
    pub status: PaymentStatus,
    /// Course ids whose seats this settlement has already reserved.
    /// Persisted after every grant so a resumed run never double-reserves.
    pub reserved: BTreeSet<String>,
}

impl PaymentRecord {
    pub fn recorded(
        charge_ref: impl Into<String>,
        account_id: impl Into<String>,
        course_ids: BTreeSet<String>,
        amount_cents: u64,
    ) -> Self {
        PaymentRecord {
            charge_ref: charge_ref.into(),
            account_id: account_id.into(),
            course_ids,
            amount_cents,
            created_at_ms: now_ms(),
            status: PaymentStatus::Recorded,
            reserved: BTreeSet::new(),
        }
    }
}

impl Model for PaymentRecord {
    const COLLECTION: &'static str = "payments";
    fn id(&self) -> &str {
        &self.charge_ref
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
