//! Session-level PostgreSQL advisory locks.
//!
//! A session lock belongs to the connection that took it, so callers hold a
//! dedicated [`PoolConnection`] for the whole critical section and release
//! the lock on that same connection.

use sqlx::pool::PoolConnection;
use sqlx::{Connection, Postgres};

/// Try to take the lock without waiting. Returns `false` if another session
/// holds it.
pub async fn try_acquire(
    conn: &mut PoolConnection<Postgres>,
    lock_id: i64,
) -> Result<bool, sqlx::Error> {
    let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .bind(lock_id)
        .fetch_one(&mut **conn)
        .await?;
    Ok(acquired)
}

/// Release a lock taken with [`try_acquire`] on the same connection.
pub async fn release(conn: &mut PoolConnection<Postgres>, lock_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(lock_id)
        .execute(&mut **conn)
        .await?;
    Ok(())
}

/// Take `conn` out of the pool and close it.
///
/// Ending the session drops every advisory lock it still holds. Used when
/// [`release`] fails, so the lock does not stay held by an idle pooled
/// connection.
pub async fn discard(conn: PoolConnection<Postgres>) -> Result<(), sqlx::Error> {
    conn.detach().close().await
}
