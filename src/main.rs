//! IBC Denom Tracer Service
//!
//! Periodically resolves the provenance of denoms carried by stored IBC
//! transfer packets and upserts the results into Postgres.

use std::sync::Arc;

use denom_tracer::batch::BatchRunner;
use denom_tracer::config::Config;
use denom_tracer::db::{self, PgStore};
use denom_tracer::server::{self, Metrics, TracerStats};
use tokio::sync::RwLock;
use tracing::info;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting IBC Denom Tracer");

    let config = Config::load()?;
    info!(
        interval_ms = config.batch.interval_ms,
        batch_size = config.batch.batch_size,
        concurrency = config.batch.concurrency,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database.url).await?;
    info!("Database connected");

    db::run_migrations(&pool).await?;
    info!("Database migrations complete");

    let stats = Arc::new(RwLock::new(TracerStats::default()));
    let metrics = Arc::new(Metrics::new());

    let server_stats = stats.clone();
    let server_metrics = metrics.clone();
    let bind_address = config.server.bind_address.clone();
    let port = config.server.port;
    tokio::spawn(async move {
        if let Err(e) = server::start_server(&bind_address, port, server_stats, server_metrics).await
        {
            tracing::error!(error = %e, "Health server error");
        }
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    let runner = BatchRunner::new(
        Arc::new(PgStore::new(pool)),
        config.batch.clone(),
        stats,
        metrics,
    );
    runner.run(shutdown_rx).await?;

    info!("IBC Denom Tracer stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ibc_denom_tracer=debug,denom_tracer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
