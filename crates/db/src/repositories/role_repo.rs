//! Repository for the `roles` and `user_roles` tables.

use roster_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{Role, UserRoleName};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides role lookups and assignments.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Assign a role to a user by role name. Assigning a role the user
    /// already holds is a no-op.
    ///
    /// Returns `false` if no role with that name exists.
    pub async fn assign(pool: &PgPool, user_id: DbId, role_name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT $1, r.id FROM roles r WHERE r.name = $2
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_name)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(Self::find_by_name(pool, role_name).await?.is_some())
    }

    /// Role names held by each of the given users.
    pub async fn names_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<UserRoleName>, sqlx::Error> {
        sqlx::query_as::<_, UserRoleName>(
            "SELECT ur.user_id, r.name AS role_name
             FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY ur.user_id, r.name",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }
}
