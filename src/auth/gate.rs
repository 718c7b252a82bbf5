//! Session gate
//!
//! Every request that is not under a public prefix passes through
//! [`session_gate`]. The gate re-verifies the session token with Kamiwaza on
//! each request; nothing is cached.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::cookies::SessionCookies;
use crate::AppState;
use crate::error::AppError;
use crate::kamiwaza::{KamiwazaUser, Verification};
use crate::metrics::GATE_DECISIONS_TOTAL;

/// What the gate does with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward unmodified
    Allow,
    RedirectLogin,
    /// Already signed in; leave the login page
    RedirectHome,
}

impl GateDecision {
    /// Decide from the path kind and the verification outcome
    ///
    /// `verification` is `None` when the request carried no session cookie.
    /// `Invalid` and `Error` are treated alike.
    pub fn evaluate(on_login_page: bool, verification: Option<Verification>) -> Self {
        let verified = verification.is_some_and(Verification::is_valid);
        match (on_login_page, verified) {
            (true, true) => GateDecision::RedirectHome,
            (true, false) => GateDecision::Allow,
            (false, true) => GateDecision::Allow,
            (false, false) => GateDecision::RedirectLogin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GateDecision::Allow => "allow",
            GateDecision::RedirectLogin => "redirect_login",
            GateDecision::RedirectHome => "redirect_home",
        }
    }
}

/// Whether `path` bypasses the gate
///
/// A prefix matches itself and anything below it (`/static` matches
/// `/static/app.css` but not `/staticky`).
pub fn is_public_path(path: &str, public_prefixes: &[String]) -> bool {
    public_prefixes.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Middleware enforcing a verified session
///
/// On a verified session the Kamiwaza user is added to the request
/// extensions for [`CurrentUser`].
///
/// # Usage
/// ```ignore
/// let app = Router::new()
///     .route("/", get(home))
///     .layer(middleware::from_fn_with_state(state.clone(), session_gate));
/// ```
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = &state.config.auth;
    let path = request.uri().path().to_owned();

    if is_public_path(&path, &auth.public_prefixes) {
        return next.run(request).await;
    }

    let on_login_page = path == auth.login_path;

    let mut user = None;
    let verification = match SessionCookies::get(&jar) {
        None => None,
        Some(token) => match state.kamiwaza.current_user(&token).await {
            Ok(found) => {
                user = Some(found);
                Some(Verification::Valid)
            }
            Err(error) => {
                let verification = Verification::from_error(&error);
                tracing::warn!(
                    %error,
                    path = %path,
                    verification = verification.as_str(),
                    "Session token not accepted"
                );
                Some(verification)
            }
        },
    };

    let decision = GateDecision::evaluate(on_login_page, verification);
    GATE_DECISIONS_TOTAL
        .with_label_values(&[decision.as_str()])
        .inc();
    tracing::debug!(
        path = %path,
        verification = verification.map_or("absent", Verification::as_str),
        decision = decision.as_str(),
        "Session gate decision"
    );

    match decision {
        GateDecision::Allow => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GateDecision::RedirectLogin => Redirect::temporary(&auth.login_path).into_response(),
        GateDecision::RedirectHome => Redirect::temporary(&auth.home_path).into_response(),
    }
}

/// Extractor for the user verified by the gate
///
/// Only available on gated routes.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub KamiwazaUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<KamiwazaUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
