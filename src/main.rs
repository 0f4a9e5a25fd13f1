use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notes_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting notes API server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    let pool = db::connect(&config).await?;
    tracing::info!("Database connected: {}", config.database_url);

    db::migrate(&pool).await?;
    tracing::info!("Database migrations completed");

    let state = AppState::new(pool, config.clone());
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Token lifetime: {} minutes", config.token_ttl_minutes);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
