//! Chat page and its script.

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use axum::response::{Html, IntoResponse};

use crate::http::extractors::session::{PresentedSession, session_cookie};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");
const SCRIPT_JS: &str = include_str!("../../../assets/script.js");

/// GET / - Start a fresh conversation and serve the chat page.
///
/// Every load issues a new session id and retires the one the browser
/// presented, so a reload always begins with an empty history.
pub async fn index(
    State(state): State<AppState>,
    PresentedSession(previous): PresentedSession,
) -> impl IntoResponse {
    let session_id = state.sessions.issue(previous.as_ref());

    (
        [
            (SET_COOKIE, session_cookie(&session_id)),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        Html(INDEX_HTML),
    )
}

/// GET /static/script.js
pub async fn script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}
