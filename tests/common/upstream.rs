//! Stub Kamiwaza and Exa servers

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

/// Token the stub identity provider accepts
pub const VALID_TOKEN: &str = "valid-token";
/// Token that makes the current-user endpoint fail with a 500
pub const BROKEN_TOKEN: &str = "broken-token";
pub const EXA_API_KEY: &str = "test-exa-key";

/// Shared state observed by tests
#[derive(Default)]
pub struct StubState {
    /// Number of current-user lookups served
    pub user_lookups: AtomicUsize,
    /// When set, the model list answers 500
    pub fail_models: AtomicBool,
    /// When set, the deployment list answers 500
    pub fail_deployments: AtomicBool,
    /// When set, Exa answers 500
    pub fail_search: AtomicBool,
    /// Body of the most recent Exa request
    pub last_search: Mutex<Option<Value>>,
}

impl StubState {
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    pub fn last_search(&self) -> Option<Value> {
        self.last_search.lock().unwrap().clone()
    }
}

pub fn stub_router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/auth/token", post(issue_token))
        .route("/api/auth/users/me", get(current_user))
        .route("/api/models/", get(list_models))
        .route("/api/serving/deployments", get(list_deployments))
        .route("/exa/findSimilar", post(find_similar))
        .with_state(state)
}

async fn issue_token(Form(form): Form<HashMap<String, String>>) -> Response {
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    let grant_type = form.get("grant_type").map(String::as_str);

    if grant_type == Some("password") && username == Some("alice") && password == Some("correct")
    {
        Json(json!({
            "access_token": VALID_TOKEN,
            "token_type": "bearer",
            "expires_in": 3600
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect username or password" })),
        )
            .into_response()
    }
}

async fn current_user(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.user_lookups.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(VALID_TOKEN) => Json(json!({
            "id": "user-1",
            "username": "alice",
            "email": "alice@example.com",
            "is_superuser": false
        }))
        .into_response(),
        Some(BROKEN_TOKEN) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn list_models(State(state): State<Arc<StubState>>) -> Response {
    if state.fail_models.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(json!([
        { "id": "m1", "name": "llama", "version": "3.1", "description": "General chat" },
        { "id": "m2", "name": "qwen", "description": "Coding" },
        { "id": "m3", "name": "mistral" }
    ]))
    .into_response()
}

async fn list_deployments(State(state): State<Arc<StubState>>) -> Response {
    if state.fail_deployments.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(json!([
        { "id": "d1", "m_id": "m2", "lb_port": 51100, "status": "DEPLOYED" },
        { "id": "d2", "m_id": "unknown", "lb_port": 51200, "status": "DEPLOYED" }
    ]))
    .into_response()
}

async fn find_similar(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(EXA_API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    *state.last_search.lock().unwrap() = Some(body.clone());

    if state.fail_search.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "search backend down").into_response();
    }

    Json(json!({
        "requestId": "req-1",
        "results": [
            {
                "id": "https://rival-one.com",
                "url": "https://rival-one.com",
                "title": "Rival One",
                "summary": "Rival One sells the same widgets.",
                "text": "Full page text"
            },
            {
                "id": "https://rival-two.com",
                "url": "https://rival-two.com",
                "title": "Rival Two",
                "summary": "Rival Two makes cheaper widgets.",
                "score": 0.87
            }
        ]
    }))
    .into_response()
}
