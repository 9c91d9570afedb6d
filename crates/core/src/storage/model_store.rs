use crate::model::{ModelState, SimilarityTable, TradeMatrix};
use crate::storage::trades::load_all_trades;
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Writes one snapshot row. The trade store itself lives in the trades table;
/// the snapshot carries the derived matrix and similarity table plus the
/// version they were computed at, so a restart can resume without a rebuild.
pub async fn persist_snapshot(pool: &sqlx::PgPool, state: &ModelState) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let matrix = serde_json::to_value(&state.matrix).context("serialize matrix failed")?;
    let similarity =
        serde_json::to_value(&state.similarity).context("serialize similarity failed")?;

    sqlx::query(
        "INSERT INTO model_snapshots \
           (id, version, generated_at, user_count, symbol_count, trade_count, matrix, similarity) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .persistent(false)
    .bind(id)
    .bind(state.version as i64)
    .bind(state.generated_at)
    .bind(state.matrix.user_count() as i32)
    .bind(state.matrix.symbol_count() as i32)
    .bind(state.trades.len() as i64)
    .bind(matrix)
    .bind(similarity)
    .execute(pool)
    .await
    .context("insert model_snapshots failed")?;

    Ok(id)
}

/// Reassembles the latest persisted model. Returns `None` when no snapshot
/// exists yet. If trades were appended after the snapshot was taken, the
/// snapshot is stale and the model is rebuilt from the store instead.
pub async fn load_latest(pool: &sqlx::PgPool) -> anyhow::Result<Option<ModelState>> {
    let row = sqlx::query_as::<_, (i64, DateTime<Utc>, i64, serde_json::Value, serde_json::Value)>(
        "SELECT version, generated_at, trade_count, matrix, similarity \
         FROM model_snapshots \
         ORDER BY version DESC, generated_at DESC \
         LIMIT 1",
    )
    .persistent(false)
    .fetch_optional(pool)
    .await
    .context("select model_snapshots failed")?;

    let Some((version, generated_at, trade_count, matrix, similarity)) = row else {
        return Ok(None);
    };

    let trades = load_all_trades(pool).await?;
    if trades.len() as i64 != trade_count {
        tracing::warn!(
            snapshot_trades = trade_count,
            store_trades = trades.len(),
            "snapshot out of sync with trade store; rebuilding"
        );
        let state = ModelState::build_versioned(trades, version as u64 + 1)?;
        return Ok(Some(state));
    }

    let matrix: TradeMatrix =
        serde_json::from_value(matrix).context("deserialize matrix failed")?;
    let similarity: SimilarityTable =
        serde_json::from_value(similarity).context("deserialize similarity failed")?;

    Ok(Some(ModelState {
        version: version as u64,
        generated_at,
        trades,
        matrix,
        similarity,
    }))
}

/// Latest snapshot if present, otherwise a fresh build from the trade store.
/// An empty database yields an empty version-1 model.
pub async fn load_or_build(pool: &sqlx::PgPool) -> anyhow::Result<ModelState> {
    if let Some(state) = load_latest(pool).await? {
        return Ok(state);
    }
    let trades = load_all_trades(pool).await?;
    Ok(ModelState::build(trades)?)
}
