//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Recoverable errors become JSON notices with a matching status code.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::languages::supported_languages;
use crate::logic::{self, OpError};
use crate::protocol::*;
use crate::session::SessionError;
use crate::state::AppState;

impl IntoResponse for OpError {
  fn into_response(self) -> Response {
    let status = match &self {
      OpError::Session(SessionError::UnknownSession) => StatusCode::NOT_FOUND,
      OpError::Session(SessionError::Configuration) => StatusCode::INTERNAL_SERVER_ERROR,
      OpError::Session(_) => StatusCode::BAD_REQUEST,
      OpError::Gateway(_) => StatusCode::BAD_GATEWAY,
      OpError::Stale => StatusCode::CONFLICT,
    };
    let body = serde_json::json!({ "error": self.to_string() });
    (status, Json(body)).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_get_languages() -> impl IntoResponse {
  Json(LanguagesOut { languages: supported_languages() })
}

#[instrument(level = "info", skip(state, body), fields(source = %body.source, target = %body.target))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CreateSessionIn>,
) -> Result<Json<SessionOut>, OpError> {
  let out = logic::start_session(&state, &body.source, &body.target).await?;
  info!(target: "session", id = %out.session_id, "HTTP session started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::snapshot(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_new_text(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionRefIn>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::generate_round(&state, &body.session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, text_len = body.text.len()))]
pub async fn http_submit_translation(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslationIn>,
) -> Result<Json<ReviewOut>, OpError> {
  let out = logic::submit_translation(&state, &body.session_id, &body.text).await?;
  info!(target: "session", id = %body.session_id, adjusted = out.adjusted_score, "HTTP translation reviewed");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_request_hints(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionRefIn>,
) -> Result<Json<HintsOut>, OpError> {
  let words = logic::request_hints(&state, &body.session_id).await?;
  Ok(Json(HintsOut { words }))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, text_len = body.text.len()))]
pub async fn http_paste_text(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PasteIn>,
) -> Result<Json<serde_json::Value>, OpError> {
  let message = logic::paste_text(&state, &body.session_id, body.text).await?;
  Ok(Json(serde_json::json!({ "confirmationRequired": true, "message": message })))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, accept = body.accept))]
pub async fn http_confirm_paste(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ConfirmPasteIn>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::confirm_paste(&state, &body.session_id, body.accept).await?))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_next_round(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionRefIn>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::next_round(&state, &body.session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, source = %body.source, target = %body.target))]
pub async fn http_set_languages(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SetLanguagesIn>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::set_languages(&state, &body.session_id, &body.source, &body.target).await?))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id))]
pub async fn http_swap_languages(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionRefIn>,
) -> Result<Json<SessionOut>, OpError> {
  Ok(Json(logic::swap_languages(&state, &body.session_id).await?))
}

// --- Proxy-mode collaborators ---

/// `{prompt}` in, `{aiResponse}` or `{error}` out. This is the endpoint a
/// browser client in proxy mode talks to; failures stay 200 with an error
/// field, matching the historical wire shape.
#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
  let Some(gateway) = state.gateway.as_ref() else {
    return Json(GenerateOut { ai_response: None, error: Some("AI credential not configured".into()) });
  };
  match gateway.generate(&body.prompt).await {
    Ok(text) => Json(GenerateOut { ai_response: Some(text), error: None }),
    Err(e) => Json(GenerateOut { ai_response: None, error: Some(e.to_string()) }),
  }
}

/// Hand the server-held key to clients running in direct-SDK mode.
#[instrument(level = "info", skip(state))]
pub async fn http_get_key(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.gateway.as_ref() {
    Some(crate::gateway::Gateway::Gemini(client)) => (
      StatusCode::OK,
      Json(KeyOut { api_key: Some(client.api_key().to_string()), error: None }),
    ),
    _ => (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(KeyOut { api_key: None, error: Some("Gemini API key not configured".into()) }),
    ),
  }
}
