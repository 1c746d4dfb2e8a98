//! Account lifecycle domain logic.
//!
//! Decides, per account, whether to suspend it, delete it, or leave it
//! alone. This is pure logic with no database dependencies; all data access
//! happens in `roster-db`, and decisions are carried out by the applier in
//! `roster-worker`. The module provides:
//!
//! - Account and enrollment fact types
//! - The immutable [`LifecycleConfig`] snapshot
//! - Role exclusion and latest-course-end aggregation
//! - Per-account rule evaluation
//! - The lazy batch driver over an account snapshot

pub mod config;
pub mod enrollment;
pub mod exclusion;
pub mod pass;
pub mod rules;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{DbId, Timestamp};

pub use config::LifecycleConfig;
pub use enrollment::{latest_course_end, EnrollmentFact};
pub use exclusion::is_excluded;
pub use pass::{run_pass, AccountFacts, AccountFactsProvider, FactsIndex, LifecyclePass};
pub use rules::{evaluate, Decision, LifecycleAction, LifecycleRule};

/// Days counted per month by the deletion threshold.
///
/// Months are fixed 30-day periods, not calendar months.
pub const DAYS_PER_MONTH: i64 = 30;

/// Read-only snapshot of an account as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: DbId,
    pub username: String,
    pub created_at: Timestamp,
    pub suspended: bool,
    pub deleted: bool,
}

/// Set of role names held by one account.
pub type RoleSet = BTreeSet<String>;

/// Domain errors for the lifecycle subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Data unavailable for account #{account_id}: {reason}")]
    DataUnavailable { account_id: DbId, reason: String },
}

/// PostgreSQL advisory lock ID for lifecycle passes.
/// Only one pass can run at a time across all worker processes.
pub const LIFECYCLE_LOCK_ID: i64 = 604_215_377;
