//! Kamiwaza Scout - Kamiwaza-authenticated competitor search
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Session Gate (middleware)                 │
//! │  - access_token cookie                                      │
//! │  - verified against Kamiwaza on every request               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Login / home pages                                       │
//! │  - Auth, models and competitor-search JSON endpoints        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Upstream Clients                        │
//! │  - Kamiwaza (identity, models, deployments)                 │
//! │  - Exa (find similar and contents)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and pages
//! - `auth`: Session cookie and request gate
//! - `kamiwaza`: Kamiwaza client, model catalog, model endpoints
//! - `search`: Exa client
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod kamiwaza;
pub mod metrics;
pub mod search;

use std::sync::Arc;

use tokio::sync::RwLock;

/// Application state shared across all handlers
///
/// Cloned for each request. Holds no per-session data: the session lives
/// entirely in the browser cookie.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Kamiwaza identity and catalog client
    pub kamiwaza: Arc<kamiwaza::KamiwazaClient>,

    /// Exa search client
    pub exa: Arc<search::ExaClient>,

    /// Last successfully loaded model catalog
    pub models: Arc<RwLock<kamiwaza::ModelCatalog>>,

    /// Session cookie store
    pub cookies: auth::SessionCookies,
}

impl AppState {
    /// Initialize application state
    ///
    /// The model catalog starts empty; call [`AppState::refresh_models`]
    /// to load it.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("KamiwazaScout/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(
                config.server.upstream_timeout_seconds,
            ))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;
        let http_client = Arc::new(http_client);

        let kamiwaza_client =
            kamiwaza::KamiwazaClient::new(&config.kamiwaza.uri, http_client.clone());
        let exa = search::ExaClient::new(&config.exa, http_client);
        let cookies = auth::SessionCookies::new(config.should_use_secure_cookies());

        tracing::info!(
            kamiwaza = %kamiwaza_client.base_url(),
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            kamiwaza: Arc::new(kamiwaza_client),
            exa: Arc::new(exa),
            models: Arc::new(RwLock::new(kamiwaza::ModelCatalog::default())),
            cookies,
        })
    }

    /// Reload the model catalog from Kamiwaza
    ///
    /// The stored catalog is replaced only on success.
    pub async fn refresh_models(&self) -> Result<kamiwaza::ModelCatalog, error::AppError> {
        let catalog = kamiwaza::ModelCatalog::initialize(&self.kamiwaza).await?;
        *self.models.write().await = catalog.clone();
        Ok(catalog)
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, extract::DefaultBodyLimit, middleware};
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    const MAX_BODY_BYTES: usize = 64 * 1024;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::pages_router(&state.config.auth.login_path))
        .nest("/api", api::api_router())
        .merge(api::metrics_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_gate,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
