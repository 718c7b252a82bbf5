//! API layer
//!
//! HTTP handlers for:
//! - Authentication (login, logout, current user)
//! - Model catalog
//! - Competitor search
//! - HTML pages
//! - Metrics (Prometheus)

mod auth;
mod competitors;
pub mod metrics;
mod models;
mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use auth::LoginRequest;
pub use competitors::{CompetitorSearchRequest, CompetitorSearchResponse};
pub use metrics::metrics_router;
pub use models::{ModelDetailResponse, ModelListResponse};
pub use pages::pages_router;

/// Create JSON API router (nested under `/api`)
///
/// Routes:
/// - POST /auth/login
/// - GET /auth/me
/// - POST /auth/logout
/// - GET /models
/// - GET /models/:id
/// - POST /findcompetitors
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/models", get(models::list_models))
        .route("/models/:id", get(models::get_model))
        .route("/findcompetitors", post(competitors::find_competitors))
}
