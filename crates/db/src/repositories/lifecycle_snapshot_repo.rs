//! Loads the account population evaluated by one lifecycle pass.

use roster_core::lifecycle::{Account, FactsIndex};
use roster_core::types::DbId;
use sqlx::PgPool;

use super::{CourseRepo, RoleRepo, UserRepo};
use crate::models::lifecycle::LifecycleSnapshot;

/// Builds [`LifecycleSnapshot`]s from the user, role, and enrollment tables.
pub struct LifecycleSnapshotRepo;

impl LifecycleSnapshotRepo {
    /// Load every non-deleted account holding `base_role`, with all of its
    /// role names and enrollment end dates.
    ///
    /// Three set-based queries regardless of population size.
    pub async fn load(pool: &PgPool, base_role: &str) -> Result<LifecycleSnapshot, sqlx::Error> {
        let accounts: Vec<Account> = UserRepo::list_active_with_role(pool, base_role)
            .await?
            .into_iter()
            .map(Account::from)
            .collect();

        let ids: Vec<DbId> = accounts.iter().map(|a| a.id).collect();

        let mut facts = FactsIndex::new();
        for id in &ids {
            facts.insert_account(*id);
        }

        if !ids.is_empty() {
            for row in RoleRepo::names_for_users(pool, &ids).await? {
                facts.add_role(row.user_id, row.role_name);
            }
            for row in CourseRepo::enrollment_ends_for_users(pool, &ids).await? {
                facts.add_enrollment(row.into());
            }
        }

        tracing::debug!(
            base_role,
            accounts = accounts.len(),
            "Loaded lifecycle snapshot"
        );

        Ok(LifecycleSnapshot { accounts, facts })
    }
}
