use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use common::{
    database::{health_check, init_pool},
    telemetry::init_tracing,
};
use profile_service::{
    config::Settings, messaging::RabbitPublisher, object_store::S3PhotoStorage,
    repositories::PgProfileStore, routes, service::ProfileService, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.logging.level);
    settings.validate()?;

    info!("Starting profile service: {}", settings.summary());

    // Initialize database connection pool
    let pool = init_pool(&settings.database).await?;
    if health_check(&pool).await {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let photo_storage = Arc::new(S3PhotoStorage::connect(&settings.object_storage).await?);
    let publisher = Arc::new(RabbitPublisher::connect(&settings.messaging).await?);
    let store = Arc::new(PgProfileStore::new(pool.clone()));

    let profile_service = ProfileService::new(
        store,
        publisher.clone(),
        photo_storage,
        settings.object_storage.public_prefix.clone(),
    );

    let app = routes::create_router(AppState { profile_service }, &settings.cors.allowed_origins);

    let address = settings.server.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Profile service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    if let Err(e) = publisher.close().await {
        warn!("Failed to close message broker connection: {}", e);
    }
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
