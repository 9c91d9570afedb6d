use anyhow::Context;

// Advisory locks are scoped to the Postgres session. This is used as a
// best-effort guard against two rebuild runs racing each other: the rebuild
// path is read-store, build, persist, and a concurrent writer would persist
// a snapshot that misses the other run's trades.
const REBUILD_LOCK_KEY: i64 = 0x5452_4144_4550; // "TRADEP" as hex-ish namespace.

pub async fn try_acquire_rebuild_lock(pool: &sqlx::PgPool) -> anyhow::Result<bool> {
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(REBUILD_LOCK_KEY)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to acquire advisory lock (key={REBUILD_LOCK_KEY})"))?;
    Ok(acquired.0)
}

pub async fn release_rebuild_lock(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(REBUILD_LOCK_KEY)
        .execute(pool)
        .await
        .with_context(|| format!("failed to release advisory lock (key={REBUILD_LOCK_KEY})"))?;
    Ok(())
}
