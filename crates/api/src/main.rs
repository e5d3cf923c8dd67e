use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

mod app;
mod config;
mod error;
mod extractors;
mod middleware;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and the Prometheus recorder
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!(
        environment = %config.environment,
        "Starting Dinner Host API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Create database pool
    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    // Run migrations
    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool);

    // Start server; the peer address keys the guest rate limiter
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
