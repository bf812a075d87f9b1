//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/languages", get(http::http_get_languages))
        .route("/api/v1/session", post(http::http_create_session))
        .route("/api/v1/session/:id", get(http::http_get_session))
        .route("/api/v1/round", post(http::http_new_text))
        .route("/api/v1/translation", post(http::http_submit_translation))
        .route("/api/v1/hints", post(http::http_request_hints))
        .route("/api/v1/paste", post(http::http_paste_text))
        .route("/api/v1/paste/confirm", post(http::http_confirm_paste))
        .route("/api/v1/next", post(http::http_next_round))
        .route("/api/v1/languages/set", post(http::http_set_languages))
        .route("/api/v1/languages/swap", post(http::http_swap_languages))
        // Proxy-mode collaborators
        .route("/api/v1/generate", post(http::http_generate))
        .route("/api/v1/key", get(http::http_get_key))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use axum_test::TestServer;
    use tokio::sync::RwLock;

    use crate::config::Prompts;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            gateway: None,
            prompts: Prompts::default(),
        })
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server.get("/api/v1/health").await;
        res.assert_status_ok();
        let body: serde_json::Value = res.json();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn languages_endpoint_lists_the_table() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server.get("/api/v1/languages").await;
        res.assert_status_ok();
        let body: serde_json::Value = res.json();
        let langs = body["languages"].as_array().unwrap();
        assert!(langs.iter().any(|l| l["code"] == "es" && l["nativeName"] == "Español"));
    }

    #[tokio::test]
    async fn session_creation_without_credentials_is_a_configuration_error() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server
            .post("/api/v1/session")
            .json(&serde_json::json!({ "source": "es", "target": "en" }))
            .await;
        res.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = res.json();
        assert_eq!(body["error"], "AI credential not configured");
    }

    #[tokio::test]
    async fn key_endpoint_reports_missing_credential() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server.get("/api/v1/key").await;
        res.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = res.json();
        assert_eq!(body["error"], "Gemini API key not configured");
    }

    #[tokio::test]
    async fn generate_endpoint_stays_200_with_an_error_field() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server
            .post("/api/v1/generate")
            .json(&serde_json::json!({ "prompt": "Create a text" }))
            .await;
        res.assert_status_ok();
        let body: serde_json::Value = res.json();
        assert!(body["error"].is_string());
        assert!(body.get("aiResponse").is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let server = TestServer::new(build_router(test_state())).unwrap();
        let res = server
            .post("/api/v1/round")
            .json(&serde_json::json!({ "sessionId": "nope" }))
            .await;
        res.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
