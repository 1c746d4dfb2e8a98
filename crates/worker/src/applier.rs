//! Executes lifecycle decisions against storage.
//!
//! The evaluator only produces decisions; this module turns them into
//! writes. Each account is handled independently: a failed write is
//! recorded in the [`ApplyReport`] and the batch moves on.

use std::collections::HashMap;

use async_trait::async_trait;
use roster_core::lifecycle::{Account, Decision, LifecycleAction};
use roster_core::types::DbId;
use roster_db::repositories::UserRepo;
use roster_db::DbPool;
use serde::Serialize;

/// Per-account write failures.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("Account #{0} not found")]
    NotFound(DbId),

    #[error("Account #{0} is already suspended")]
    AlreadySuspended(DbId),

    #[error("Account #{0} is already deleted")]
    AlreadyDeleted(DbId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Receiver of suspend and delete commands.
#[async_trait]
pub trait ActionApplier: Send + Sync {
    async fn suspend(&self, account: &Account) -> Result<(), ApplyError>;

    async fn delete(&self, account: &Account) -> Result<(), ApplyError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL applier
// ---------------------------------------------------------------------------

/// Writes decisions to the `users` table.
///
/// Both writes are conditional on the current row state, so when two passes
/// overlap only one of them changes a given account; the other gets
/// [`ApplyError::AlreadySuspended`] or [`ApplyError::AlreadyDeleted`].
pub struct PgActionApplier {
    pool: DbPool,
}

impl PgActionApplier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Work out why a conditional write touched no rows.
    async fn explain_noop(&self, account_id: DbId) -> ApplyError {
        match UserRepo::find_by_id(&self.pool, account_id).await {
            Ok(Some(user)) if user.deleted => ApplyError::AlreadyDeleted(account_id),
            Ok(Some(user)) if user.suspended => ApplyError::AlreadySuspended(account_id),
            Ok(_) => ApplyError::NotFound(account_id),
            Err(e) => ApplyError::Database(e),
        }
    }
}

#[async_trait]
impl ActionApplier for PgActionApplier {
    async fn suspend(&self, account: &Account) -> Result<(), ApplyError> {
        if UserRepo::suspend(&self.pool, account.id).await? {
            tracing::info!(account_id = account.id, username = %account.username, "Suspended account");
            Ok(())
        } else {
            Err(self.explain_noop(account.id).await)
        }
    }

    async fn delete(&self, account: &Account) -> Result<(), ApplyError> {
        if UserRepo::delete_account(&self.pool, account.id).await? {
            tracing::info!(account_id = account.id, username = %account.username, "Deleted account");
            Ok(())
        } else {
            Err(self.explain_noop(account.id).await)
        }
    }
}

// ---------------------------------------------------------------------------
// Dry-run applier
// ---------------------------------------------------------------------------

/// Logs every decision and writes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunApplier;

#[async_trait]
impl ActionApplier for DryRunApplier {
    async fn suspend(&self, account: &Account) -> Result<(), ApplyError> {
        tracing::info!(account_id = account.id, username = %account.username, "Dry run: would suspend account");
        Ok(())
    }

    async fn delete(&self, account: &Account) -> Result<(), ApplyError> {
        tracing::info!(account_id = account.id, username = %account.username, "Dry run: would delete account");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Batch application
// ---------------------------------------------------------------------------

/// One decision that could not be applied.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyFailure {
    pub account_id: DbId,
    pub action: LifecycleAction,
    pub error: String,
}

/// Outcome of applying a batch of decisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub suspended: usize,
    pub deleted: usize,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    fn record_failure(&mut self, account_id: DbId, action: LifecycleAction, error: &ApplyError) {
        tracing::error!(account_id, %action, error = %error, "Failed to apply lifecycle decision");
        self.failures.push(ApplyFailure {
            account_id,
            action,
            error: error.to_string(),
        });
    }
}

/// Apply `decisions` in order, looking each account up in `accounts`.
///
/// Failures are collected per account and never stop the batch. A decision
/// for an account missing from `accounts` is reported as
/// [`ApplyError::NotFound`]; `NoAction` decisions are ignored.
pub async fn apply_decisions<A, I>(applier: &A, accounts: &[Account], decisions: I) -> ApplyReport
where
    A: ActionApplier + ?Sized,
    I: IntoIterator<Item = Decision>,
{
    let by_id: HashMap<DbId, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
    let mut report = ApplyReport::default();

    for decision in decisions {
        let Some(account) = by_id.get(&decision.account_id).copied() else {
            if decision.is_actionable() {
                let error = ApplyError::NotFound(decision.account_id);
                report.record_failure(decision.account_id, decision.action, &error);
            }
            continue;
        };

        let result = match decision.action {
            LifecycleAction::NoAction => continue,
            LifecycleAction::Suspend => applier.suspend(account).await,
            LifecycleAction::Delete => applier.delete(account).await,
        };

        match result {
            Ok(()) if decision.action == LifecycleAction::Suspend => report.suspended += 1,
            Ok(()) => report.deleted += 1,
            Err(e) => report.record_failure(account.id, decision.action, &e),
        }
    }

    report
}
