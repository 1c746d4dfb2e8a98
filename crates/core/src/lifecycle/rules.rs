//! Per-account rule evaluation.
//!
//! [`evaluate`] looks at one account, its roles, and its enrollments, and
//! returns a [`Decision`]. It never touches storage or the clock: `now` and
//! the configuration are passed in, so the same inputs always give the same
//! decision.

use std::fmt;

use chrono::TimeDelta;
use serde::Serialize;

use super::config::LifecycleConfig;
use super::enrollment::{latest_course_end, EnrollmentFact};
use super::exclusion::is_excluded;
use super::{Account, RoleSet};
use crate::types::{DbId, Timestamp};

/// Verdict for one account in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    NoAction,
    Suspend,
    Delete,
}

impl LifecycleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::Suspend => "suspend",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that fired while evaluating an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleRule {
    /// The account holds an excluded role.
    RoleExclusion,
    /// Too long since the latest course end.
    CourseEndSuspension,
    /// Too long since the account was created.
    CreationSuspension,
    /// Long enough since the latest course end to delete.
    CourseEndDeletion,
}

/// Outcome of evaluating one account.
///
/// `rules` lists every rule that fired, in evaluation order, even when the
/// resolved action is [`LifecycleAction::NoAction`] (for example a
/// suspension rule on an account that is already suspended).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub account_id: DbId,
    pub action: LifecycleAction,
    pub rules: Vec<LifecycleRule>,
}

impl Decision {
    fn no_action(account_id: DbId, rules: Vec<LifecycleRule>) -> Self {
        Self {
            account_id,
            action: LifecycleAction::NoAction,
            rules,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.action != LifecycleAction::NoAction
    }
}

/// Evaluate one account against the configured thresholds.
///
/// 1. An account holding any excluded role is left alone.
/// 2. The latest defined course end drives the course-end rules; accounts
///    with no defined end are only judged on their creation date.
/// 3. Deletion beats suspension. Suspension is only emitted for accounts
///    that are not already suspended.
///
/// Elapsed times are compared with a strict greater-than, so a course that
/// has not ended yet (negative elapsed time) never fires a rule.
pub fn evaluate(
    account: &Account,
    roles: &RoleSet,
    facts: &[EnrollmentFact],
    now: Timestamp,
    config: &LifecycleConfig,
) -> Decision {
    if is_excluded(roles, &config.excluded_roles) {
        return Decision::no_action(account.id, vec![LifecycleRule::RoleExclusion]);
    }

    let mut rules = Vec::new();

    if let Some(end) = latest_course_end(facts) {
        let since_end = now - end;
        if exceeds(since_end, config.course_end_suspension_after()) {
            rules.push(LifecycleRule::CourseEndSuspension);
        }
        if exceeds(since_end, config.course_end_deletion_after()) {
            rules.push(LifecycleRule::CourseEndDeletion);
        }
    }

    let since_creation = now - account.created_at;
    if exceeds(since_creation, config.creation_suspension_after()) {
        rules.push(LifecycleRule::CreationSuspension);
    }

    let should_delete = rules.contains(&LifecycleRule::CourseEndDeletion);
    let should_suspend = rules.iter().any(|r| {
        matches!(
            r,
            LifecycleRule::CourseEndSuspension | LifecycleRule::CreationSuspension
        )
    });

    let action = if should_delete {
        LifecycleAction::Delete
    } else if should_suspend && !account.suspended {
        LifecycleAction::Suspend
    } else {
        LifecycleAction::NoAction
    };

    Decision {
        account_id: account.id,
        action,
        rules,
    }
}

/// Strict comparison against an optional threshold; `None` is never exceeded.
fn exceeds(elapsed: TimeDelta, threshold: Option<TimeDelta>) -> bool {
    threshold.is_some_and(|limit| elapsed > limit)
}
