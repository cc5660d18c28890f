use std::{error::Error, sync::Arc, time::Duration};

use meals_share::{
    adapters::{
        repositories::SqliteMealRepository, routes::router, share_sessions::ShareSessions,
        state::AppState,
    },
    application::{repositories::meal_repository::MealRepository, services::ImageStorageService},
    domain::config::app::AppConfig,
    services::{LocalImageStorage, MemoryPreviewStore},
};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting meals-share on port {}", config.port);

    info!("Connecting to database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    let meal_repo = SqliteMealRepository::new(pool.clone());
    meal_repo
        .init_schema()
        .await
        .map_err(|e| format!("Failed to initialise schema: {:?}", e))?;
    if let Some(seed_file) = &config.seed_file {
        meal_repo
            .seed_from_file(seed_file)
            .await
            .map_err(|e| format!("Failed to seed meals: {:?}", e))?;
    }
    info!("Database ready");

    let previews = Arc::new(MemoryPreviewStore::new("/previews"));
    let share_sessions = Arc::new(ShareSessions::new(previews.clone(), config.max_image_size));
    let eviction = share_sessions
        .clone()
        .spawn_eviction(Duration::from_secs(config.share_session_ttl_secs));

    let port = config.port;
    let app_state = AppState {
        image_storage: Arc::new(LocalImageStorage::new(&config.images_dir, "/images"))
            as Arc<dyn ImageStorageService>,
        meal_repository: Arc::new(meal_repo) as Arc<dyn MealRepository>,
        previews,
        share_sessions,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eviction.abort();
    pool.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
