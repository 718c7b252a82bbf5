//! Kamiwaza HTTP client
//!
//! Talks to the identity endpoints (token issuance, current user) and the
//! catalog endpoints (models, deployments).

use std::sync::Arc;
use std::time::Instant;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::metrics::observe_upstream;

/// OAuth2 password-grant token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Current-user object returned by Kamiwaza
///
/// Fields the service does not interpret are carried through untouched so
/// `/api/auth/me` can return the full object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KamiwazaUser {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Model as listed by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct KamiwazaModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Running deployment of a model
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    pub id: String,
    /// Identifier of the deployed model
    pub m_id: String,
    /// Load-balancer port serving the model
    pub lb_port: u16,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome of checking a session token against Kamiwaza
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Kamiwaza returned the current user
    Valid,
    /// Kamiwaza rejected the token (401/403)
    Invalid,
    /// Kamiwaza could not be asked or answered unusably
    Error,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }

    /// Classify a failed current-user lookup
    pub fn from_error(error: &AppError) -> Self {
        match error {
            AppError::Unauthorized => Verification::Invalid,
            _ => Verification::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verification::Valid => "valid",
            Verification::Invalid => "invalid",
            Verification::Error => "error",
        }
    }
}

/// Client for the Kamiwaza API
#[derive(Debug, Clone)]
pub struct KamiwazaClient {
    base_url: String,
    http_client: Arc<reqwest::Client>,
}

impl KamiwazaClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, http_client: Arc<reqwest::Client>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Base URI the client was built with (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for an access token
    ///
    /// `POST /auth/token` with a form-encoded password grant.
    pub async fn get_token(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let started = Instant::now();
        let result = self.request_token(username, password).await;
        observe_upstream("kamiwaza", "token", result.is_ok(), started);
        result
    }

    async fn request_token(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http_client
            .post(self.endpoint("/auth/token"))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection("token", status));
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    /// Look up the user owning `token`
    ///
    /// `GET /auth/users/me` with a bearer header. A 401/403 maps to
    /// `AppError::Unauthorized`.
    pub async fn current_user(&self, token: &str) -> Result<KamiwazaUser, AppError> {
        let started = Instant::now();
        let result = self.request_current_user(token).await;
        observe_upstream("kamiwaza", "current_user", result.is_ok(), started);
        result
    }

    async fn request_current_user(&self, token: &str) -> Result<KamiwazaUser, AppError> {
        let response = self
            .http_client
            .get(self.endpoint("/auth/users/me"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection("current user", status));
        }

        Ok(response.json::<KamiwazaUser>().await?)
    }

    /// `GET /models/`
    pub async fn list_models(&self) -> Result<Vec<KamiwazaModel>, AppError> {
        self.get_list("/models/", "list_models").await
    }

    /// `GET /serving/deployments`
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>, AppError> {
        self.get_list("/serving/deployments", "list_deployments")
            .await
    }

    async fn get_list<T>(&self, path: &str, operation: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let started = Instant::now();
        let result = self.request_list(path, operation).await;
        observe_upstream("kamiwaza", operation, result.is_ok(), started);
        result
    }

    async fn request_list<T>(&self, path: &str, operation: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.http_client.get(self.endpoint(path)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(operation, status));
        }

        Ok(response.json::<Vec<T>>().await?)
    }
}

fn rejection(operation: &str, status: StatusCode) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized,
        _ => AppError::Upstream(format!("Kamiwaza {operation} returned {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = KamiwazaClient::new(
            "https://kamiwaza.example.com/api/",
            Arc::new(reqwest::Client::new()),
        );
        assert_eq!(client.base_url(), "https://kamiwaza.example.com/api");
        assert_eq!(
            client.endpoint("/auth/users/me"),
            "https://kamiwaza.example.com/api/auth/users/me"
        );
    }

    #[test]
    fn rejected_token_maps_to_unauthorized() {
        assert!(matches!(
            rejection("current user", StatusCode::UNAUTHORIZED),
            AppError::Unauthorized
        ));
        assert!(matches!(
            rejection("current user", StatusCode::FORBIDDEN),
            AppError::Unauthorized
        ));
        assert!(matches!(
            rejection("current user", StatusCode::BAD_GATEWAY),
            AppError::Upstream(_)
        ));
    }

    #[test]
    fn user_keeps_unknown_fields() {
        let user: KamiwazaUser = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "username": "alice",
            "is_superuser": false
        }))
        .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.extra.get("is_superuser"), Some(&serde_json::json!(false)));

        let round = serde_json::to_value(&user).unwrap();
        assert_eq!(round["is_superuser"], serde_json::json!(false));
        assert!(round.get("email").is_none());
    }
}
