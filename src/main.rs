use std::{sync::Arc, time::Duration};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhouse::{
    api,
    auth::AuthService,
    config::Settings,
    repository::SqliteKeyValueRepository,
    service::ServiceContext,
    store::{sync::spawn_resync, EntityStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Clubhouse server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Hydrate the entity store
    let repo = Arc::new(SqliteKeyValueRepository::new(db_pool.clone()));
    let store = Arc::new(EntityStore::open(repo, settings.sync.channel_capacity).await?);

    let _resync = spawn_resync(
        store.clone(),
        Duration::from_secs(settings.sync.resync_interval_secs),
    );

    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        &settings.auth.demo_password,
        settings.auth.session_duration_hours,
    )?);

    match auth_service.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
    }

    let service_context = Arc::new(ServiceContext::new(store, auth_service));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
