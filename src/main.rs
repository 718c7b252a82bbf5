//! Kamiwaza Scout binary entry point

use kamiwaza_scout::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging from the `[logging]` section
/// 3. Initialize AppState and load the model catalog
/// 4. Build Axum router
/// 5. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging; RUST_LOG still wins over logging.level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter_directives().into());

    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!(
        kamiwaza = %config.kamiwaza.uri,
        environment = ?config.server.environment,
        "Starting Kamiwaza Scout..."
    );
    if !config.should_use_secure_cookies() {
        tracing::warn!(
            environment = ?config.server.environment,
            "Using insecure session cookies outside production"
        );
    }

    kamiwaza_scout::metrics::init_metrics();

    // 3. Initialize application state
    let state = AppState::new(config.clone())?;

    // The catalog is reloaded on every page visit, so a failure here is
    // not fatal.
    match state.refresh_models().await {
        Ok(catalog) => tracing::info!(models = catalog.models().len(), "Model catalog loaded"),
        Err(error) => tracing::warn!(%error, "Model catalog unavailable at startup"),
    }

    // 4. Build Axum router
    let app = kamiwaza_scout::build_router(state);

    // 5. Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
