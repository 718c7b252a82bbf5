//! Authentication API
//!
//! - POST /api/auth/login
//! - GET /api/auth/me
//! - POST /api/auth/logout
//!
//! These routes sit under a public prefix: the session gate never sees them.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::AppState;
use crate::auth::SessionCookies;
use crate::error::AppError;
use crate::kamiwaza::KamiwazaUser;
use crate::metrics::LOGIN_ATTEMPTS_TOTAL;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// # Steps
/// 1. Exchange credentials for a Kamiwaza access token
/// 2. Confirm the token resolves to a user
/// 3. Store the token in the session cookie
///
/// Every failure, including a malformed body, answers 401 with the same
/// message and sets no cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    let Json(credentials) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected malformed login request");
        LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
        AppError::AuthenticationFailed
    })?;

    tracing::info!(username = %credentials.username, "Login attempt");

    let token = match authenticate(&state, &credentials).await {
        Ok(token) => token,
        Err(error) => {
            tracing::warn!(username = %credentials.username, %error, "Login failed");
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
            return Err(AppError::AuthenticationFailed);
        }
    };

    LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
    tracing::info!(username = %credentials.username, "Login succeeded");

    let jar = state.cookies.set(jar, token);
    Ok((jar, Json(serde_json::json!({ "success": true }))))
}

async fn authenticate(state: &AppState, credentials: &LoginRequest) -> Result<String, AppError> {
    let token = state
        .kamiwaza
        .get_token(&credentials.username, &credentials.password)
        .await?;
    state.kamiwaza.current_user(&token.access_token).await?;
    Ok(token.access_token)
}

/// GET /api/auth/me
///
/// Returns the signed-in user, or `null` when there is no session or the
/// lookup fails.
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Json<Option<KamiwazaUser>> {
    let Some(token) = SessionCookies::get(&jar) else {
        return Json(None);
    };

    match state.kamiwaza.current_user(&token).await {
        Ok(user) => Json(Some(user)),
        Err(error) => {
            tracing::warn!(%error, "Failed to get current user");
            Json(None)
        }
    }
}

/// POST /api/auth/logout
///
/// Clears the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    (
        state.cookies.remove(jar),
        Json(serde_json::json!({ "success": true })),
    )
}
