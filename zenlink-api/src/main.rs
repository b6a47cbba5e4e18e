use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zenlink_api::{app, state::AppState};
use zenlink_reclaimer::{FileRunLog, ReservationReclaimer};
use zenlink_store::{DbClient, PgReservationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zenlink_api=debug,zenlink_reclaimer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = zenlink_store::app_config::Config::load()?;
    tracing::info!("Starting Zenlink reclaimer service on port {}", config.server.port);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let store = Arc::new(PgReservationStore::new(db.pool.clone()));
    let run_log = Arc::new(FileRunLog::open(&config.reclaimer.log_path)?);
    let reclaimer = Arc::new(ReservationReclaimer::new(
        store,
        run_log,
        config.reclaimer.ttl_minutes,
    ));

    tokio::spawn(worker_task(
        reclaimer.clone(),
        config.reclaimer.interval_seconds,
    ));

    let app = app(AppState { reclaimer });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn worker_task(reclaimer: Arc<ReservationReclaimer>, interval_seconds: u64) {
    zenlink_api::worker::start_reclaim_worker(reclaimer, Duration::from_secs(interval_seconds))
        .await;
}
