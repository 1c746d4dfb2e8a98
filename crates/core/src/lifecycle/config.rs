//! Immutable threshold configuration for one evaluation pass.

use std::collections::BTreeSet;

use chrono::TimeDelta;
use serde::Serialize;

use super::DAYS_PER_MONTH;
use crate::roles::EXCLUDED_ROLES;

/// Default days after the latest course end before an account is suspended.
pub const DEFAULT_DISABLE_AFTER_COURSE_END_DAYS: u32 = 21;

/// Default days after account creation before an account is suspended.
pub const DEFAULT_DISABLE_AFTER_CREATION_DAYS: u32 = 45;

/// Default months after the latest course end before an account is deleted.
pub const DEFAULT_DELETE_AFTER_COURSE_END_MONTHS: u32 = 6;

/// Thresholds and exclusions applied to every account in a pass.
///
/// Loaded once per pass and never mutated while the pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleConfig {
    pub disable_after_course_end_days: u32,
    pub disable_after_creation_days: u32,
    pub delete_after_course_end_months: u32,
    pub excluded_roles: BTreeSet<String>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            disable_after_course_end_days: DEFAULT_DISABLE_AFTER_COURSE_END_DAYS,
            disable_after_creation_days: DEFAULT_DISABLE_AFTER_CREATION_DAYS,
            delete_after_course_end_months: DEFAULT_DELETE_AFTER_COURSE_END_MONTHS,
            excluded_roles: default_excluded_roles(),
        }
    }
}

impl LifecycleConfig {
    /// Build a config with the given thresholds and the compiled-in
    /// exclusion set.
    pub fn new(
        disable_after_course_end_days: u32,
        disable_after_creation_days: u32,
        delete_after_course_end_months: u32,
    ) -> Self {
        Self {
            disable_after_course_end_days,
            disable_after_creation_days,
            delete_after_course_end_months,
            excluded_roles: default_excluded_roles(),
        }
    }

    /// Replace the exclusion set.
    pub fn with_excluded_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Elapsed time after the latest course end beyond which an account is
    /// suspended. `None` means the threshold can never be exceeded.
    pub fn course_end_suspension_after(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(i64::from(self.disable_after_course_end_days))
    }

    /// Elapsed time after account creation beyond which an account is
    /// suspended.
    pub fn creation_suspension_after(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(i64::from(self.disable_after_creation_days))
    }

    /// Elapsed time after the latest course end beyond which an account is
    /// deleted. Each month counts as [`DAYS_PER_MONTH`] days.
    pub fn course_end_deletion_after(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(i64::from(self.delete_after_course_end_months) * DAYS_PER_MONTH)
    }
}

/// The exclusion set used when no override is given.
pub fn default_excluded_roles() -> BTreeSet<String> {
    EXCLUDED_ROLES.iter().map(|r| (*r).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let config = LifecycleConfig::default();
        assert_eq!(config.disable_after_course_end_days, 21);
        assert_eq!(config.disable_after_creation_days, 45);
        assert_eq!(config.delete_after_course_end_months, 6);
        assert_eq!(config.excluded_roles.len(), 5);
        assert!(config.excluded_roles.contains("editingteacher"));
        assert!(!config.excluded_roles.contains("student"));
    }

    #[test]
    fn deletion_threshold_uses_thirty_day_months() {
        let config = LifecycleConfig::new(21, 45, 6);
        assert_eq!(config.course_end_deletion_after(), Some(TimeDelta::days(180)));
    }

    #[test]
    fn oversized_threshold_is_unreachable() {
        let config = LifecycleConfig::new(u32::MAX, 45, u32::MAX);
        assert_eq!(config.course_end_deletion_after(), None);
    }

    #[test]
    fn excluded_roles_can_be_overridden() {
        let config = LifecycleConfig::default().with_excluded_roles(["auditor"]);
        assert_eq!(config.excluded_roles.len(), 1);
        assert!(config.excluded_roles.contains("auditor"));
    }
}
