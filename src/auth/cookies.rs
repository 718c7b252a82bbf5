//! Session cookie store
//!
//! The session is the Kamiwaza access token itself, kept in a single
//! HTTP-only cookie. There is no server-side session storage and no renewal:
//! the browser drops the cookie an hour after login.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the session cookie
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Lifetime of the session cookie in seconds
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60;

/// Reads, writes and deletes the session cookie
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    /// `secure` adds the `Secure` attribute (production only)
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Store `token` as the session
    pub fn set(&self, jar: CookieJar, token: impl Into<String>) -> CookieJar {
        jar.add(self.build_cookie(token.into()))
    }

    /// Current session token, if any
    ///
    /// An empty cookie counts as absent.
    pub fn get(jar: &CookieJar) -> Option<String> {
        jar.get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|token| !token.is_empty())
    }

    /// Delete the session cookie
    pub fn remove(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
    }

    fn build_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((ACCESS_TOKEN_COOKIE, token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECS))
            .build()
    }
}
