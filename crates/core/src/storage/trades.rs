use crate::domain::trade::{Trade, TradeType};
use anyhow::Context;
use chrono::NaiveDate;
use uuid::Uuid;

/// Appends trades in one transaction, batched to keep round trips down.
/// The store is append-only; there is no update or delete path.
pub async fn insert_trades(pool: &sqlx::PgPool, trades: &[Trade]) -> anyhow::Result<u64> {
    if trades.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let chunk_size: usize = std::env::var("TRADES_INSERT_BATCH")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(200);
    anyhow::ensure!(chunk_size >= 1, "TRADES_INSERT_BATCH must be >= 1");

    let mut inserted: u64 = 0;
    for chunk in trades.chunks(chunk_size) {
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO trades (id, user_id, symbol, trade_date, price, quantity, trade_type) ",
        );
        qb.push_values(chunk, |mut b, trade| {
            b.push_bind(Uuid::new_v4())
                .push_bind(&trade.user_id)
                .push_bind(&trade.symbol)
                .push_bind(trade.trade_date)
                .push_bind(trade.price)
                .push_bind(trade.quantity)
                .push_bind(trade.trade_type.as_str());
        });

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch insert trades failed")?;
        inserted += res.rows_affected();
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(inserted)
}

/// Loads the whole store in insertion order. The order matters: it is the
/// first-appearance order the model uses as a deterministic tie-break.
pub async fn load_all_trades(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Trade>> {
    let rows = sqlx::query_as::<_, (String, String, NaiveDate, f64, f64, String)>(
        "SELECT user_id, symbol, trade_date, price, quantity, trade_type \
         FROM trades \
         ORDER BY seq ASC",
    )
    .persistent(false)
    .fetch_all(pool)
    .await
    .context("select trades failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for (user_id, symbol, trade_date, price, quantity, trade_type) in rows {
        let trade_type = TradeType::parse(&trade_type)
            .with_context(|| format!("unknown trade_type in trades table: {trade_type}"))?;
        out.push(Trade {
            user_id,
            symbol,
            trade_date,
            price,
            quantity,
            trade_type,
        });
    }
    Ok(out)
}
