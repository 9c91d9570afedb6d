use anyhow::Context;

pub mod lock;
pub mod model_store;
pub mod trades;

/// Idempotent schema setup. Plain DDL instead of migration files keeps the
/// two tables self-describing and lets binaries run against a fresh database
/// without a separate migrate step.
pub async fn init_schema(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS trades ( \
           id UUID PRIMARY KEY, \
           seq BIGSERIAL, \
           user_id TEXT NOT NULL, \
           symbol TEXT NOT NULL, \
           trade_date DATE NOT NULL, \
           price DOUBLE PRECISION NOT NULL, \
           quantity DOUBLE PRECISION NOT NULL, \
           trade_type TEXT NOT NULL, \
           inserted_at TIMESTAMPTZ NOT NULL DEFAULT now() \
         )",
    )
    .persistent(false)
    .execute(pool)
    .await
    .context("create trades table failed")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS model_snapshots ( \
           id UUID PRIMARY KEY, \
           version BIGINT NOT NULL, \
           generated_at TIMESTAMPTZ NOT NULL, \
           user_count INT NOT NULL, \
           symbol_count INT NOT NULL, \
           trade_count BIGINT NOT NULL, \
           matrix JSONB NOT NULL, \
           similarity JSONB NOT NULL \
         )",
    )
    .persistent(false)
    .execute(pool)
    .await
    .context("create model_snapshots table failed")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS model_snapshots_version_idx \
         ON model_snapshots (version DESC, generated_at DESC)",
    )
    .persistent(false)
    .execute(pool)
    .await
    .context("create model_snapshots index failed")?;

    Ok(())
}
