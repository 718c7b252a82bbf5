//! Exa content-search client
//!
//! Only the "find similar and contents" call is used: given a company URL,
//! return similar sites with their text and a short plain-language summary.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::ExaConfig;
use crate::error::AppError;
use crate::metrics::observe_upstream;

/// One similar page returned by Exa
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorResult {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CompetitorResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindSimilarRequest<'a> {
    url: &'a str,
    num_results: u32,
    exclude_domains: [&'a str; 1],
    contents: ContentsOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ContentsOptions<'a> {
    text: bool,
    summary: SummaryOptions<'a>,
    livecrawl: &'static str,
}

#[derive(Debug, Serialize)]
struct SummaryOptions<'a> {
    query: &'a str,
}

/// Client for the Exa API
#[derive(Debug, Clone)]
pub struct ExaClient {
    base_url: String,
    api_key: String,
    num_results: u32,
    summary_query: String,
    http_client: Arc<reqwest::Client>,
}

impl ExaClient {
    pub fn new(config: &ExaConfig, http_client: Arc<reqwest::Client>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            num_results: config.num_results,
            summary_query: config.summary_query.clone(),
            http_client,
        }
    }

    /// Find sites similar to `url`, excluding `url` itself
    ///
    /// Pages are crawled live and come back with full text and a summary.
    pub async fn find_similar_and_contents(
        &self,
        url: &str,
    ) -> Result<Vec<CompetitorResult>, AppError> {
        let started = Instant::now();
        let result = self.request_find_similar(url).await;
        observe_upstream("exa", "find_similar", result.is_ok(), started);
        result
    }

    async fn request_find_similar(&self, url: &str) -> Result<Vec<CompetitorResult>, AppError> {
        let body = self.find_similar_body(url);

        let response = self
            .http_client
            .post(format!("{}/findSimilar", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Exa findSimilar returned {status}: {}",
                detail.trim()
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::debug!(url, results = parsed.results.len(), "Exa search completed");
        Ok(parsed.results)
    }

    fn find_similar_body<'a>(&'a self, url: &'a str) -> FindSimilarRequest<'a> {
        FindSimilarRequest {
            url,
            num_results: self.num_results,
            exclude_domains: [url],
            contents: ContentsOptions {
                text: true,
                summary: SummaryOptions {
                    query: &self.summary_query,
                },
                livecrawl: "always",
            },
        }
    }
}
