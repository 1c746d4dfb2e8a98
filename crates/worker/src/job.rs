//! Scheduled account lifecycle job.
//!
//! Spawned as a background task that runs one pass per interval: load a
//! fresh snapshot of the base-role population, evaluate it, and apply the
//! resulting decisions. Runs until its [`CancellationToken`] is cancelled.

use chrono::Utc;
use roster_core::lifecycle::{run_pass, LifecycleConfig, LIFECYCLE_LOCK_ID};
use roster_core::types::Timestamp;
use roster_db::models::lifecycle::LifecycleSnapshot;
use roster_db::repositories::LifecycleSnapshotRepo;
use roster_db::{advisory_lock, DbPool};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::applier::{apply_decisions, ActionApplier, ApplyFailure, DryRunApplier, PgActionApplier};
use crate::config::WorkerConfig;

/// Display name of the job, used in logs.
pub const JOB_NAME: &str = "Clean up student accounts";

/// Errors that abort a whole pass.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Another lifecycle pass is already running")]
    AlreadyRunning,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Summary of one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    /// Accounts evaluated, including those skipped for missing data.
    pub scanned: usize,
    /// Accounts skipped because their facts were unavailable.
    pub skipped: usize,
    pub suspended: usize,
    pub deleted: usize,
    pub failures: Vec<ApplyFailure>,
    pub dry_run: bool,
}

/// Evaluate `snapshot` and hand every actionable decision to `applier`.
///
/// Decisions are applied as the pass produces them; the pass is never
/// materialised as a whole.
pub async fn execute_pass<A>(
    snapshot: &LifecycleSnapshot,
    now: Timestamp,
    config: &LifecycleConfig,
    applier: &A,
) -> PassReport
where
    A: ActionApplier + ?Sized,
{
    let mut pass = run_pass(&snapshot.accounts, snapshot, now, config);
    let applied = apply_decisions(applier, &snapshot.accounts, pass.by_ref()).await;

    PassReport {
        scanned: pass.scanned(),
        skipped: pass.skipped().len(),
        suspended: applied.suspended,
        deleted: applied.deleted,
        failures: applied.failures,
        dry_run: false,
    }
}

// ---------------------------------------------------------------------------
// LifecycleJob
// ---------------------------------------------------------------------------

/// Background service running lifecycle passes on a fixed interval.
pub struct LifecycleJob {
    pool: DbPool,
    config: WorkerConfig,
}

impl LifecycleJob {
    pub fn new(pool: DbPool, config: WorkerConfig) -> Self {
        Self { pool, config }
    }

    /// Run the job loop.
    ///
    /// The first pass starts immediately. A failing pass is logged and the
    /// loop waits for the next tick. Exits when `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            job = JOB_NAME,
            interval_secs = self.config.interval.as_secs(),
            base_role = %self.config.base_role,
            dry_run = self.config.dry_run,
            "Lifecycle job started"
        );

        let mut interval = tokio::time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Lifecycle job stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(report) => log_report(&report),
                        Err(JobError::AlreadyRunning) => {
                            tracing::warn!("Lifecycle pass skipped: another pass holds the lock");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Lifecycle pass failed");
                        }
                    }
                }
            }
        }
    }

    /// Run a single pass at `now`.
    ///
    /// Holds a PostgreSQL advisory lock for the duration so overlapping
    /// passes from other processes are skipped instead of racing.
    pub async fn run_once(&self, now: Timestamp) -> Result<PassReport, JobError> {
        let mut conn = self.pool.acquire().await?;
        if !advisory_lock::try_acquire(&mut conn, LIFECYCLE_LOCK_ID).await? {
            return Err(JobError::AlreadyRunning);
        }

        let result = self.run_locked(now).await;

        if let Err(e) = advisory_lock::release(&mut conn, LIFECYCLE_LOCK_ID).await {
            tracing::error!(error = %e, "Failed to release lifecycle lock, closing connection");
            if let Err(e) = advisory_lock::discard(conn).await {
                tracing::warn!(error = %e, "Failed to close lifecycle lock connection");
            }
        }
        result
    }

    async fn run_locked(&self, now: Timestamp) -> Result<PassReport, JobError> {
        let snapshot = LifecycleSnapshotRepo::load(&self.pool, &self.config.base_role).await?;
        tracing::info!(accounts = snapshot.account_count(), "Starting lifecycle pass");

        let report = if self.config.dry_run {
            let mut report =
                execute_pass(&snapshot, now, &self.config.lifecycle, &DryRunApplier).await;
            report.dry_run = true;
            report
        } else {
            let applier = PgActionApplier::new(self.pool.clone());
            execute_pass(&snapshot, now, &self.config.lifecycle, &applier).await
        };

        Ok(report)
    }
}

fn log_report(report: &PassReport) {
    tracing::info!(
        scanned = report.scanned,
        skipped = report.skipped,
        suspended = report.suspended,
        deleted = report.deleted,
        failed = report.failures.len(),
        dry_run = report.dry_run,
        "Lifecycle pass complete"
    );
}
