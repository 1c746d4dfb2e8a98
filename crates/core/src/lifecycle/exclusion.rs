//! Role-based exclusion from lifecycle processing.

use std::collections::BTreeSet;

/// Returns `true` if the account holds at least one excluded role.
///
/// Checked before any date rule; an excluded account is never suspended or
/// deleted.
pub fn is_excluded(roles: &BTreeSet<String>, excluded_roles: &BTreeSet<String>) -> bool {
    // Walk the smaller set.
    if roles.len() <= excluded_roles.len() {
        roles.iter().any(|r| excluded_roles.contains(r))
    } else {
        excluded_roles.iter().any(|r| roles.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::config::default_excluded_roles;

    fn roles(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn student_only_is_not_excluded() {
        assert!(!is_excluded(&roles(&["student"]), &default_excluded_roles()));
    }

    #[test]
    fn any_excluded_role_matches() {
        let excluded = default_excluded_roles();
        for role in ["coursecreator", "editingteacher", "teacher", "manager", "admin"] {
            assert!(is_excluded(&roles(&["student", role]), &excluded), "{role}");
        }
    }

    #[test]
    fn empty_sets_never_match() {
        assert!(!is_excluded(&BTreeSet::new(), &default_excluded_roles()));
        assert!(!is_excluded(&roles(&["teacher"]), &BTreeSet::new()));
    }

    #[test]
    fn role_names_are_case_sensitive() {
        assert!(!is_excluded(&roles(&["Teacher"]), &default_excluded_roles()));
    }
}
