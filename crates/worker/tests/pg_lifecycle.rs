//! Lifecycle writes and passes against a real database.
//!
//! Verifies that:
//! - Conditional writes that touch no row are classified by the row state
//! - A full pass loads, evaluates, and updates the affected rows
//! - Dry runs and lock contention leave the tables untouched

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{TimeDelta, Utc};
use roster_core::lifecycle::{Account, LifecycleConfig, LIFECYCLE_LOCK_ID};
use roster_core::types::Timestamp;
use roster_db::advisory_lock;
use roster_db::models::course::CreateCourse;
use roster_db::models::user::{CreateUser, User};
use roster_db::repositories::{CourseRepo, RoleRepo, UserRepo};
use roster_worker::applier::{ActionApplier, ApplyError, PgActionApplier};
use roster_worker::config::WorkerConfig;
use roster_worker::job::{JobError, LifecycleJob};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, username: &str, created_at: Timestamp, roles: &[&str]) -> User {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.test"),
            created_at: Some(created_at),
        },
    )
    .await
    .unwrap();
    for role in roles {
        assert!(RoleRepo::assign(pool, user.id, role).await.unwrap());
    }
    user
}

async fn enroll_in_course_ended(pool: &PgPool, user: &User, ended_at: Timestamp) {
    let course = CourseRepo::create(
        pool,
        &CreateCourse {
            name: format!("Course for {}", user.username),
            end_date: Some(ended_at),
        },
    )
    .await
    .unwrap();
    CourseRepo::enroll(pool, user.id, course.id).await.unwrap();
}

async fn reload(pool: &PgPool, user: &User) -> User {
    UserRepo::find_by_id(pool, user.id).await.unwrap().unwrap()
}

fn job(pool: &PgPool, dry_run: bool) -> LifecycleJob {
    LifecycleJob::new(
        pool.clone(),
        WorkerConfig {
            database_url: String::new(),
            lifecycle: LifecycleConfig::default(),
            base_role: "student".to_string(),
            interval: Duration::from_secs(86_400),
            dry_run,
        },
    )
}

/// Three students due for action plus an excluded account.
///
/// Returns `(suspend_by_creation, delete_by_course_end, teacher)`.
async fn seed_population(pool: &PgPool) -> (User, User, User) {
    let now = Utc::now();

    let stale = user(pool, "stale", now - TimeDelta::days(46), &["student"]).await;

    let finished = user(pool, "finished", now, &["student"]).await;
    enroll_in_course_ended(pool, &finished, now - TimeDelta::days(200)).await;

    let teacher = user(pool, "teacher", now - TimeDelta::days(400), &["student", "teacher"]).await;
    enroll_in_course_ended(pool, &teacher, now - TimeDelta::days(200)).await;

    (stale, finished, teacher)
}

// ---------------------------------------------------------------------------
// PgActionApplier
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_suspend_reports_already_suspended(pool: PgPool) {
    let student = user(&pool, "student1", Utc::now(), &["student"]).await;
    let applier = PgActionApplier::new(pool.clone());
    let account = Account::from(student.clone());

    applier.suspend(&account).await.unwrap();
    assert_matches!(
        applier.suspend(&account).await,
        Err(ApplyError::AlreadySuspended(id)) if id == student.id
    );
    assert!(reload(&pool, &student).await.suspended);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_writes_after_delete_report_already_deleted(pool: PgPool) {
    let student = user(&pool, "student1", Utc::now(), &["student"]).await;
    let applier = PgActionApplier::new(pool.clone());
    let account = Account::from(student.clone());

    // Suspended first, so the row is both suspended and deleted.
    applier.suspend(&account).await.unwrap();
    applier.delete(&account).await.unwrap();

    assert_matches!(
        applier.suspend(&account).await,
        Err(ApplyError::AlreadyDeleted(id)) if id == student.id
    );
    assert_matches!(
        applier.delete(&account).await,
        Err(ApplyError::AlreadyDeleted(id)) if id == student.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_writes_for_missing_account_report_not_found(pool: PgPool) {
    let applier = PgActionApplier::new(pool.clone());
    let ghost = Account {
        id: 999_999,
        username: "ghost".to_string(),
        created_at: Utc::now(),
        suspended: false,
        deleted: false,
    };

    assert_matches!(
        applier.suspend(&ghost).await,
        Err(ApplyError::NotFound(999_999))
    );
    assert_matches!(
        applier.delete(&ghost).await,
        Err(ApplyError::NotFound(999_999))
    );
}

// ---------------------------------------------------------------------------
// LifecycleJob::run_once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_once_applies_decisions(pool: PgPool) {
    let (stale, finished, teacher) = seed_population(&pool).await;

    let report = job(&pool, false).run_once(Utc::now()).await.unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.suspended, 1);
    assert_eq!(report.deleted, 1);
    assert!(report.failures.is_empty());
    assert!(!report.dry_run);

    let stale = reload(&pool, &stale).await;
    assert!(stale.suspended);
    assert!(!stale.deleted);

    let finished = reload(&pool, &finished).await;
    assert!(finished.deleted);

    let teacher = reload(&pool, &teacher).await;
    assert!(!teacher.suspended);
    assert!(!teacher.deleted);

    // Next pass: the deleted account is gone, the suspended one is quiet.
    let report = job(&pool, false).run_once(Utc::now()).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.suspended, 0);
    assert_eq!(report.deleted, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dry_run_writes_nothing(pool: PgPool) {
    let (stale, finished, _teacher) = seed_population(&pool).await;

    let report = job(&pool, true).run_once(Utc::now()).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.suspended, 1);
    assert_eq!(report.deleted, 1);

    let stale = reload(&pool, &stale).await;
    assert!(!stale.suspended);
    let finished = reload(&pool, &finished).await;
    assert!(!finished.deleted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_once_skips_while_lock_is_held(pool: PgPool) {
    let (stale, _finished, _teacher) = seed_population(&pool).await;

    let mut holder = pool.acquire().await.unwrap();
    assert!(advisory_lock::try_acquire(&mut holder, LIFECYCLE_LOCK_ID).await.unwrap());

    assert_matches!(
        job(&pool, false).run_once(Utc::now()).await,
        Err(JobError::AlreadyRunning)
    );
    assert!(!reload(&pool, &stale).await.suspended);

    advisory_lock::release(&mut holder, LIFECYCLE_LOCK_ID).await.unwrap();
    let report = job(&pool, false).run_once(Utc::now()).await.unwrap();
    assert_eq!(report.suspended, 1);
}
