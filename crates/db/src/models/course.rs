//! Course and enrollment models.

use roster_core::lifecycle::EnrollmentFact;
use roster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub name: String,
    /// `None` when the course has no defined end.
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub name: String,
    pub end_date: Option<Timestamp>,
}

/// An enrollment joined with its course end date.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentEnd {
    pub user_id: DbId,
    pub end_date: Option<Timestamp>,
}

impl From<EnrollmentEnd> for EnrollmentFact {
    fn from(row: EnrollmentEnd) -> Self {
        EnrollmentFact::new(row.user_id, row.end_date)
    }
}
