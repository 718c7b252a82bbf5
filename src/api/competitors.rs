//! Competitor search
//!
//! POST /api/findcompetitors proxies to Exa's "find similar and contents".

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppError;
use crate::metrics::COMPETITOR_SEARCHES_TOTAL;
use crate::search::CompetitorResult;

#[derive(Debug, Deserialize)]
pub struct CompetitorSearchRequest {
    #[serde(default)]
    pub websiteurl: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompetitorSearchResponse {
    pub results: Vec<CompetitorResult>,
}

/// POST /api/findcompetitors
///
/// Body: `{ "websiteurl": "https://..." }`
///
/// # Errors
/// - 400 when the URL is missing or empty
/// - 500 when the body cannot be read or the search fails
pub async fn find_competitors(
    State(state): State<AppState>,
    payload: Result<Json<CompetitorSearchRequest>, JsonRejection>,
) -> Result<Json<CompetitorSearchResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Search(rejection.body_text()))?;

    let website_url = request
        .websiteurl
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::Validation("Website URL is required".to_string()))?;

    let results = state
        .exa
        .find_similar_and_contents(&website_url)
        .await
        .map_err(|error| {
            tracing::error!(website_url = %website_url, %error, "Competitor search failed");
            AppError::Search(error.to_string())
        })?;

    COMPETITOR_SEARCHES_TOTAL.inc();
    tracing::info!(
        website_url = %website_url,
        results = results.len(),
        "Competitor search completed"
    );

    Ok(Json(CompetitorSearchResponse { results }))
}
