//! Kamiwaza session authentication
//!
//! Handles:
//! - Session cookie storage
//! - Per-request session gate
//! - Current user extraction

mod cookies;
mod gate;

pub use cookies::{ACCESS_TOKEN_COOKIE, SESSION_MAX_AGE_SECS, SessionCookies};
pub use gate::{CurrentUser, GateDecision, is_public_path, session_gate};
