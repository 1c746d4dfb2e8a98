//! Enrollment facts and latest-course-end aggregation.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// One enrollment of an account in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentFact {
    pub account_id: DbId,
    /// Course end, or `None` when the course has no defined end.
    pub course_end: Option<Timestamp>,
}

impl EnrollmentFact {
    pub fn new(account_id: DbId, course_end: Option<Timestamp>) -> Self {
        Self {
            account_id,
            course_end,
        }
    }

    /// The end date if it is defined. Timestamps at or before the Unix epoch
    /// count as "no end date".
    pub fn defined_end(&self) -> Option<Timestamp> {
        self.course_end.filter(|end| end.timestamp() > 0)
    }
}

/// Latest defined course end across all of an account's enrollments.
///
/// Returns `None` when there are no enrollments or none of them has a
/// defined end. The maximum wins: one course still running protects the
/// account from the course-end rules even if older courses ended long ago.
pub fn latest_course_end(facts: &[EnrollmentFact]) -> Option<Timestamp> {
    facts.iter().filter_map(EnrollmentFact::defined_end).max()
}
