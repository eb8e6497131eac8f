use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skema::api::router;
use skema::auth::LoginState;
use skema::clock::SystemClock;
use skema::config::{AppConfig, NotifierKind};
use skema::db::{KeyValueStore, Preferences, SessionStore, SqliteKvStore};
use skema::export::DirectorySink;
use skema::notify::{DesktopNotifier, LogNotifier, Notifier};
use skema::services::{RefreshScheduler, SchedulePresenter, SyncManager};
use skema::source::HttpScheduleSource;
use skema::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "skema=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKvStore::new(pool.clone()));
    let prefs = Preferences::new(kv.clone());

    let notifier: Arc<dyn Notifier> = match config.notifier {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::new("Skema")),
        NotifierKind::Log => Arc::new(LogNotifier),
    };

    let sync = Arc::new(SyncManager::new(
        SessionStore::new(kv),
        prefs.clone(),
        Arc::new(HttpScheduleSource::new(&config.source_url, config.fetch_timeout)?),
        notifier,
        Arc::new(SystemClock),
    ));

    let refresher =
        RefreshScheduler::new(sync.clone(), config.refresh_interval, config.prefetch_weeks).spawn();

    let state = AppState {
        db: pool.clone(),
        schedule: Arc::new(SchedulePresenter::new(
            sync,
            Arc::new(DirectorySink::new(&config.export_dir)),
        )),
        login: Arc::new(LoginState::load(prefs).await?),
    };

    let app = router(state);

    info!("listening on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    refresher.stop();
    info!("shut down");

    Ok(())
}
