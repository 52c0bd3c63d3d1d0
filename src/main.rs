use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reviewer_service::api;
use reviewer_service::assignment::RandomSource;
use reviewer_service::config::AppConfig;
use reviewer_service::database::Database;
use reviewer_service::ReviewService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewer_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reviewer service");

    let config = AppConfig::load().context("failed to load configuration")?;
    info!("Configuration loaded");

    let database = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Database connected");

    database.run_migrations().await?;
    info!("Database migrations completed");

    let service = ReviewService::new(database.clone(), RandomSource::Entropy);
    let app = api::router(service);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
