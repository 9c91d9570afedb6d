use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod seed;

#[derive(Debug, Parser)]
#[command(name = "tradepeer_worker")]
struct Args {
    /// JSON file with an array of trade records; defaults to the built-in
    /// sample book when neither this nor --from-broker is given.
    #[arg(long)]
    trades_file: Option<String>,

    /// Ingest the account's recent filled orders from the brokerage API as
    /// this user's trades.
    #[arg(long, conflicts_with = "trades_file")]
    from_broker: Option<String>,

    /// Order page size for --from-broker.
    #[arg(long, default_value_t = 50)]
    orders_limit: usize,

    /// Build the model in memory and log a summary without touching the
    /// database.
    #[arg(long)]
    dry_run: bool,

    /// Log the top picks for this user after the rebuild.
    #[arg(long)]
    recommend_for: Option<String>,

    /// Result length for --recommend-for.
    #[arg(long, default_value_t = 5)]
    top_n: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = tradepeer_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let incoming = if let Some(path) = args.trades_file.as_deref() {
        seed::load_trades_file(path)?
    } else if let Some(user_id) = args.from_broker.as_deref() {
        fetch_broker_trades(&settings, user_id, args.orders_limit).await?
    } else {
        seed::sample_trades()
    };

    if args.dry_run {
        let state = tradepeer_core::model::ModelState::build(incoming)?;
        tracing::info!(
            dry_run = true,
            users = state.matrix.user_count(),
            symbols = state.matrix.symbol_count(),
            trades = state.trades.len(),
            "model built (not persisted)"
        );
        log_recommendations(&state, args.recommend_for.as_deref(), args.top_n);
        return Ok(());
    }

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    tradepeer_core::storage::init_schema(&pool).await?;

    let acquired = tradepeer_core::storage::lock::try_acquire_rebuild_lock(&pool).await?;
    if !acquired {
        tracing::warn!("rebuild lock not acquired; another run in progress");
        return Ok(());
    }

    let run = ingest_and_rebuild(&pool, incoming).await;

    match &run {
        Ok(state) => {
            log_recommendations(state, args.recommend_for.as_deref(), args.top_n);
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(err);
            tracing::error!(error = %err, "rebuild run failed");
        }
    }

    if let Err(err) = tradepeer_core::storage::lock::release_rebuild_lock(&pool).await {
        tracing::warn!(error = %err, "failed to release rebuild lock; it expires with the session");
    }
    run.map(|_| ())
}

async fn fetch_broker_trades(
    settings: &tradepeer_core::config::Settings,
    user_id: &str,
    limit: usize,
) -> anyhow::Result<Vec<tradepeer_core::domain::trade::Trade>> {
    use tradepeer_core::broker::client::BrokerClient;

    let broker = tradepeer_core::broker::client::HttpBrokerClient::from_settings(settings)?;
    let orders = broker.fetch_recent_orders(limit).await?;
    let trades = tradepeer_core::broker::types::trades_from_orders(&orders, user_id);

    tracing::info!(
        %user_id,
        orders = orders.len(),
        trades = trades.len(),
        "fetched broker order history"
    );
    anyhow::ensure!(!trades.is_empty(), "broker returned no filled orders to ingest");
    Ok(trades)
}

async fn ingest_and_rebuild(
    pool: &sqlx::PgPool,
    incoming: Vec<tradepeer_core::domain::trade::Trade>,
) -> anyhow::Result<tradepeer_core::model::ModelState> {
    let inserted = tradepeer_core::storage::trades::insert_trades(pool, &incoming).await?;
    tracing::info!(inserted, "trades ingested");

    let trades = tradepeer_core::storage::trades::load_all_trades(pool).await?;
    let version = tradepeer_core::storage::model_store::load_latest(pool)
        .await?
        .map(|s| s.version + 1)
        .unwrap_or(1);

    let state = tradepeer_core::model::ModelState::build_versioned(trades, version)?;
    let snapshot_id = tradepeer_core::storage::model_store::persist_snapshot(pool, &state).await?;

    tracing::info!(
        %snapshot_id,
        version = state.version,
        users = state.matrix.user_count(),
        symbols = state.matrix.symbol_count(),
        trades = state.trades.len(),
        "persisted model snapshot"
    );

    Ok(state)
}

fn log_recommendations(
    state: &tradepeer_core::model::ModelState,
    user_id: Option<&str>,
    top_n: usize,
) {
    let Some(user_id) = user_id else {
        return;
    };
    match state.recommend_for(user_id, top_n, &Default::default()) {
        Ok(symbols) => tracing::info!(%user_id, ?symbols, "recommendations"),
        Err(err) => tracing::warn!(%user_id, error = %err, "recommendation failed"),
    }
}

fn init_sentry(settings: &tradepeer_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
