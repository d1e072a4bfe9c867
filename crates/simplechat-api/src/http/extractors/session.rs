//! Session cookie extractors.
//!
//! The browser's session id travels in the `simplechat_session` cookie,
//! issued by `GET /`. Only ids issued by this process are accepted; a cookie
//! from a previous run, or no cookie at all, is rejected as
//! `ChatError::InvalidSession`.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use simplechat_types::chat::SessionId;
use simplechat_types::error::ChatError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "simplechat_session";

/// An active session id. Extracting this validates the cookie.
pub struct CurrentSession(pub SessionId);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_from_cookies(parts) {
            Some(id) if state.sessions.is_active(&id) => Ok(CurrentSession(id)),
            _ => Err(AppError::Chat(ChatError::InvalidSession)),
        }
    }
}

/// Whatever well-formed session id the browser sent, active or not.
pub struct PresentedSession(pub Option<SessionId>);

impl<S: Send + Sync> FromRequestParts<S> for PresentedSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PresentedSession(session_from_cookies(parts)))
    }
}

/// `Set-Cookie` value for a freshly issued session.
///
/// No `Max-Age`/`Expires`: the cookie lives for the browser session.
pub fn session_cookie(id: &SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Find and parse the session cookie among all `Cookie` headers.
fn session_from_cookies(parts: &Parts) -> Option<SessionId> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim_matches('"').parse().ok())
}
