//! User entity model and DTOs.

use roster_core::lifecycle::Account;
use roster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub suspended: bool,
    pub deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for Account {
    fn from(user: User) -> Self {
        Account {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            suspended: user.suspended,
            deleted: user.deleted,
        }
    }
}

/// DTO for creating a new user.
///
/// `created_at` defaults to `NOW()` when absent; imports of existing
/// accounts supply the original creation time.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub created_at: Option<Timestamp>,
}
