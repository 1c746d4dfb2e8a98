//! Repository for the `courses` and `enrollments` tables.

use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, EnrollmentEnd};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, end_date, created_at, updated_at";

/// Provides course CRUD and enrollment lookups.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (name, end_date)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.name)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Enroll a user in a course. Enrolling twice is a no-op.
    pub async fn enroll(pool: &PgPool, user_id: DbId, course_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO enrollments (user_id, course_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, course_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Course end dates for every enrollment of the given users.
    ///
    /// One row per enrollment; `end_date` is `None` for open-ended courses.
    pub async fn enrollment_ends_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<EnrollmentEnd>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentEnd>(
            "SELECT e.user_id, c.end_date
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             WHERE e.user_id = ANY($1)
             ORDER BY e.user_id, e.id",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }
}
