//! Common test utilities for E2E tests
//!
//! Each `TestServer` runs the real router plus two stub upstreams on random
//! local ports:
//! - Kamiwaza: accepts `alice` / `correct`, issues `valid-token`
//! - Exa: answers `findSimilar` and records the last request body

#![allow(dead_code)]

pub mod upstream;

use std::sync::Arc;

use kamiwaza_scout::{AppState, config};
use tokio::net::TcpListener;

pub use upstream::{EXA_API_KEY, StubState, VALID_TOKEN};

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub upstream: Arc<StubState>,
    /// Client that does not follow redirects
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let upstream = Arc::new(StubState::default());
        let upstream_addr = spawn(upstream::stub_router(upstream.clone())).await;

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: config::Environment::Development,
                upstream_timeout_seconds: 10,
            },
            kamiwaza: config::KamiwazaConfig {
                uri: format!("{upstream_addr}/api"),
            },
            exa: config::ExaConfig {
                api_key: EXA_API_KEY.to_string(),
                base_url: format!("{upstream_addr}/exa"),
                num_results: 6,
                summary_query: config::DEFAULT_SUMMARY_QUERY.to_string(),
            },
            auth: config::AuthConfig {
                login_path: "/login".to_string(),
                home_path: "/".to_string(),
                public_prefixes: vec![
                    "/static".to_string(),
                    "/favicon.ico".to_string(),
                    "/api/auth".to_string(),
                    "/health".to_string(),
                ],
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).unwrap();
        let addr = spawn(kamiwaza_scout::build_router(state.clone())).await;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            state,
            upstream,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// GET `path` with the given session token in the cookie
    pub async fn get_with_session(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Cookie", format!("access_token={token}"))
            .send()
            .await
            .unwrap()
    }
}

/// `Location` header of a redirect response
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// All `Set-Cookie` header values of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(ToString::to_string))
        .collect()
}

async fn spawn(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
