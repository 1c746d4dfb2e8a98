//! Repository for the `users` table.

use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, suspended, deleted, created_at, updated_at";

/// Provides CRUD and lifecycle operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, created_at)
             VALUES ($1, $2, COALESCE($3, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID, including deleted users.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List non-deleted users holding the named role, ordered by ID.
    pub async fn list_active_with_role(
        pool: &PgPool,
        role_name: &str,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u
             WHERE u.deleted = false
               AND EXISTS (
                   SELECT 1 FROM user_roles ur
                   JOIN roles r ON r.id = ur.role_id
                   WHERE ur.user_id = u.id AND r.name = $1
               )
             ORDER BY u.id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role_name)
            .fetch_all(pool)
            .await
    }

    /// Suspend a user.
    ///
    /// Returns `true` if the row was updated; `false` if the user is missing,
    /// already suspended, or deleted.
    pub async fn suspend(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET suspended = true
             WHERE id = $1 AND suspended = false AND deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user account.
    ///
    /// The row is kept and flagged `deleted`; its email is cleared and its
    /// role assignments and enrollments are removed, all in one transaction.
    /// Returns `false` (and changes nothing) if the user is missing or
    /// already deleted.
    pub async fn delete_account(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET deleted = true, email = ''
             WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM enrollments WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
