//! Axum router configuration with middleware.
//!
//! Routes: the chat page at `/`, its script under `/static/`, the chat
//! endpoint at `/chatbot`, and `/health`. Every request is traced.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::index))
        .route("/static/script.js", get(handlers::page::script))
        .route("/chatbot", post(handlers::chatbot::chatbot))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model_name,
    }))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use reqwest::StatusCode;
    use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use simplechat_core::history::store::HistoryStore;
    use simplechat_core::llm::box_provider::BoxLlmProvider;
    use simplechat_core::llm::provider::LlmProvider;
    use simplechat_infra::sqlite::history::SqliteHistoryStore;
    use simplechat_infra::sqlite::pool::DatabasePool;
    use simplechat_types::chat::{MessageRole, SessionId};
    use simplechat_types::config::AppConfig;
    use simplechat_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, StopReason, Usage,
    };

    use super::*;
    use crate::http::extractors::session::SESSION_COOKIE;

    /// Provider double: echoes the last message, or fails on demand.
    #[derive(Clone, Default)]
    struct ScriptedProvider {
        fail: bool,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(LlmError::RateLimited {
                    retry_after_ms: None,
                });
            }
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                id: "test".to_string(),
                content: format!("You asked: {last}"),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    struct TestApp {
        base: String,
        state: AppState,
        client: reqwest::Client,
        _dir: tempfile::TempDir,
    }

    async fn spawn_app(provider: ScriptedProvider) -> TestApp {
        spawn_app_with(provider, AppConfig::default()).await
    }

    async fn spawn_app_with(provider: ScriptedProvider, config: AppConfig) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("chat.db").display().to_string();
        let store = SqliteHistoryStore::new(DatabasePool::open(&location).await.unwrap());

        let state = AppState::from_parts(store, BoxLlmProvider::new(provider), config);
        let router = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestApp {
            base: format!("http://{addr}"),
            state,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    impl TestApp {
        /// Load the page and return the `name=value` cookie pair it set.
        async fn open_page(&self, cookie: Option<&str>) -> String {
            let mut request = self.client.get(format!("{}/", self.base));
            if let Some(cookie) = cookie {
                request = request.header(COOKIE, cookie);
            }
            let response = request.send().await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let set_cookie = response
                .headers()
                .get(SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            set_cookie.split(';').next().unwrap().to_string()
        }

        async fn post_message(&self, cookie: Option<&str>, message: Option<&str>) -> reqwest::Response {
            let mut request = self.client.post(format!("{}/chatbot", self.base));
            if let Some(cookie) = cookie {
                request = request.header(COOKIE, cookie);
            }
            match message {
                Some(message) => request = request.form(&[("message", message)]),
                None => request = request.form(&[("other", "x")]),
            }
            request.send().await.unwrap()
        }
    }

    fn session_of(cookie: &str) -> SessionId {
        cookie
            .strip_prefix(&format!("{SESSION_COOKIE}="))
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_page_and_sets_cookie() {
        let app = spawn_app(ScriptedProvider::default()).await;

        let response = app.client.get(format!("{}/", app.base)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));

        let body = response.text().await.unwrap();
        assert!(body.contains("/static/script.js"));
        assert_eq!(app.state.sessions.active_count(), 1);
    }

    #[tokio::test]
    async fn test_script_is_served() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let response = app
            .client
            .get(format!("{}/static/script.js", app.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("application/javascript")
        );
        assert!(response.text().await.unwrap().contains("/chatbot"));
    }

    #[tokio::test]
    async fn test_chat_turn_round_trip() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let cookie = app.open_page(None).await;

        let response = app.post_message(Some(&cookie), Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "You asked: Hello");

        let history = app
            .state
            .orchestrator
            .store()
            .load(&session_of(&cookie))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "Hello");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "You asked: Hello");
    }

    #[tokio::test]
    async fn test_second_turn_sees_first() {
        let provider = ScriptedProvider::default();
        let app = spawn_app(provider.clone()).await;
        let cookie = app.open_page(None).await;

        app.post_message(Some(&cookie), Some("Who made Loom?")).await;
        app.post_message(Some(&cookie), Some("And The Dig?")).await;

        let seen = provider.seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.messages.len(), 3);
        assert_eq!(last.messages[0].content, "Who made Loom?");
        assert_eq!(last.messages[2].content, "And The Dig?");
    }

    #[tokio::test]
    async fn test_missing_cookie_is_invalid_session() {
        let app = spawn_app(ScriptedProvider::default()).await;

        let response = app.post_message(None, Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["data"].is_null());
        assert_eq!(body["errors"][0]["code"], "INVALID_SESSION");
        assert!(body["meta"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_cookie_from_previous_process_is_rejected() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let stale = format!("{SESSION_COOKIE}={}", SessionId::generate());

        let response = app.post_message(Some(&stale), Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reload_starts_new_conversation() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let first = app.open_page(None).await;
        app.post_message(Some(&first), Some("Hello")).await;

        let second = app.open_page(Some(&first)).await;
        assert_ne!(first, second);

        // Old cookie is retired; new one starts empty.
        let response = app.post_message(Some(&first), Some("still there?")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let history = app
            .state
            .orchestrator
            .store()
            .load(&session_of(&second))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_missing_message_is_forwarded_as_empty() {
        let provider = ScriptedProvider::default();
        let app = spawn_app(provider.clone()).await;
        let cookie = app.open_page(None).await;

        let response = app.post_message(Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "You asked: ");
    }

    #[tokio::test]
    async fn test_multipart_message_reaches_model() {
        let provider = ScriptedProvider::default();
        let app = spawn_app(provider.clone()).await;
        let cookie = app.open_page(None).await;

        let form = reqwest::multipart::Form::new().text("message", "Who made Monkey Island?");
        let response = app
            .client
            .post(format!("{}/chatbot", app.base))
            .header(COOKIE, &cookie)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "You asked: Who made Monkey Island?");

        let history = app
            .state
            .orchestrator
            .store()
            .load(&session_of(&cookie))
            .await
            .unwrap();
        assert_eq!(history[0].content, "Who made Monkey Island?");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_rejected_and_records_nothing() {
        let provider = ScriptedProvider::default();
        let app = spawn_app(provider.clone()).await;
        let cookie = app.open_page(None).await;

        let response = app
            .client
            .post(format!("{}/chatbot", app.base))
            .header(COOKIE, &cookie)
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body("--XYZ\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\nHel")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "INVALID_BODY");

        let response = app
            .client
            .post(format!("{}/chatbot", app.base))
            .header(COOKIE, &cookie)
            .header(CONTENT_TYPE, "text/plain")
            .body("Hello")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        assert!(provider.seen.lock().unwrap().is_empty());
        let history = app
            .state
            .orchestrator
            .store()
            .load(&session_of(&cookie))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_cookieless_page_loads_are_bounded() {
        let app = spawn_app_with(
            ScriptedProvider::default(),
            AppConfig {
                max_sessions: 5,
                ..AppConfig::default()
            },
        )
        .await;

        for _ in 0..20 {
            app.open_page(None).await;
        }
        assert_eq!(app.state.sessions.active_count(), 5);

        // The newest session still works.
        let cookie = app.open_page(None).await;
        let response = app.post_message(Some(&cookie), Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_model_failure_is_bad_gateway_and_records_nothing() {
        let app = spawn_app(ScriptedProvider {
            fail: true,
            ..ScriptedProvider::default()
        })
        .await;
        let cookie = app.open_page(None).await;

        let response = app.post_message(Some(&cookie), Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "MODEL_INVOCATION_FAILED");

        let history = app
            .state
            .orchestrator
            .store()
            .load(&session_of(&cookie))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_service_unavailable() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let cookie = app.open_page(None).await;
        app.state.orchestrator.store().pool().close().await;

        let response = app.post_message(Some(&cookie), Some("Hello")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "STORAGE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_health() {
        let app = spawn_app(ScriptedProvider::default()).await;
        let body: serde_json::Value = app
            .client
            .get(format!("{}/health", app.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["model"], "gpt-4o");
    }
}
