//! Role entity model.

use roster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One (user, role name) pair from `user_roles` joined with `roles`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleName {
    pub user_id: DbId,
    pub role_name: String,
}
