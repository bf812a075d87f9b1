//! AI gateway: the boundary adapter to the hosted generative-text service.
//!
//! Two integration modes share one `generate(prompt) -> text` contract, so
//! the session logic never changes when the mode swaps:
//!   - `Gemini`: this server holds the key and calls the model API directly.
//!   - `Proxy`: this server forwards prompts to another proxy that holds the key.
//!
//! Calls are single-shot (no retries) and instrumented with prompt/response
//! sizes, never contents. The API key is never logged.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::decode::{decode_fenced_json, HintWords};
use crate::domain::{AiReview, Language};
use crate::util::{fill_template, shuffled};

/// Everything that can go wrong on the way to the model. All variants are
/// recoverable: the user re-triggers the operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
  #[error("network error: {0}")]
  Network(String),
  #[error("upstream HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("malformed model reply: {0}")]
  Parse(String),
  #[error("empty model reply")]
  Empty,
}

impl From<reqwest::Error> for GatewayError {
  fn from(err: reqwest::Error) -> Self {
    GatewayError::Network(err.to_string())
  }
}

/// The injected gateway handle. Constructed once at startup and owned by the
/// application state for its lifetime; never a global.
#[derive(Clone)]
pub enum Gateway {
  Gemini(GeminiClient),
  Proxy(ProxyClient),
}

impl Gateway {
  /// Build from env: TRANSLINGO_PROXY_URL selects proxy mode, otherwise
  /// GEMINI_API_KEY selects direct mode. Returns None when neither is set.
  pub fn from_env() -> Option<Self> {
    if let Some(proxy) = ProxyClient::from_env() {
      return Some(Gateway::Proxy(proxy));
    }
    GeminiClient::from_env().map(Gateway::Gemini)
  }

  pub fn mode(&self) -> &'static str {
    match self {
      Gateway::Gemini(_) => "gemini",
      Gateway::Proxy(_) => "proxy",
    }
  }

  /// Send one prompt, get raw text back.
  #[instrument(level = "info", skip(self, prompt), fields(mode = self.mode(), prompt_len = prompt.len()))]
  pub async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
    let start = std::time::Instant::now();
    let result = match self {
      Gateway::Gemini(c) => c.generate(prompt).await,
      Gateway::Proxy(c) => c.generate(prompt).await,
    };
    match &result {
      Ok(text) => info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received"),
      Err(e) => tracing::error!(elapsed = ?start.elapsed(), error = %e, "Model call failed"),
    }
    result
  }

  // --- High-level helpers (domain-specialized) ---

  /// Generate a fresh source text in the source language.
  #[instrument(level = "info", skip(self, prompts), fields(language = %source.code))]
  pub async fn generate_source_text(
    &self,
    prompts: &Prompts,
    source: &Language,
  ) -> Result<String, GatewayError> {
    let prompt = fill_template(
      &prompts.source_text_template,
      &[("native_name", &source.native_name), ("code", &source.code)],
    );
    let text = self.generate(&prompt).await?;
    let text = text.trim().to_string();
    if text.is_empty() {
      return Err(GatewayError::Empty);
    }
    Ok(text)
  }

  /// Extract hint words for the current source text. The returned list is
  /// uniformly shuffled so its order doesn't mirror the text.
  #[instrument(level = "info", skip(self, prompts, source_text), fields(text_len = source_text.len()))]
  pub async fn hint_words(
    &self,
    prompts: &Prompts,
    source: &Language,
    target: &Language,
    source_text: &str,
  ) -> Result<Vec<String>, GatewayError> {
    let prompt = fill_template(
      &prompts.hint_words_template,
      &[
        ("source_name", &source.name),
        ("source_code", &source.code),
        ("target_name", &target.name),
        ("target_code", &target.code),
        ("source_text", source_text),
      ],
    );
    let raw = self.generate(&prompt).await?;
    let parsed: HintWords = decode_fenced_json(&raw)?;
    Ok(shuffled(parsed.words))
  }

  /// Ask for a review of the user's translation.
  #[instrument(
    level = "info",
    skip(self, prompts, source_text, user_translation),
    fields(text_len = source_text.len(), translation_len = user_translation.len())
  )]
  pub async fn review_translation(
    &self,
    prompts: &Prompts,
    source: &Language,
    target: &Language,
    source_text: &str,
    user_translation: &str,
  ) -> Result<AiReview, GatewayError> {
    let prompt = fill_template(
      &prompts.review_template,
      &[
        ("source_native_name", &source.native_name),
        ("source_code", &source.code),
        ("target_native_name", &target.native_name),
        ("source_text", source_text),
        ("user_translation", user_translation),
      ],
    );
    let raw = self.generate(&prompt).await?;
    decode_fenced_json::<AiReview>(&raw)
  }
}

// --- Direct mode: Gemini generateContent ---

#[derive(Clone)]
pub struct GeminiClient {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  model: String,
}

impl GeminiClient {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// The key endpoint hands this to clients that run in direct mode.
  pub fn api_key(&self) -> &str {
    &self.api_key
  }

  async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "translingo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or(body);
      return Err(GatewayError::Http { status, message });
    }

    let body: GenerateContentResponse = res.json().await
      .map_err(|e| GatewayError::Parse(e.to_string()))?;
    let text = body.candidates.into_iter().next()
      .and_then(|c| c.content.parts.into_iter().next())
      .map(|p| p.text)
      .unwrap_or_default();

    if text.trim().is_empty() {
      return Err(GatewayError::Empty);
    }
    Ok(text)
  }
}

// --- Proxy mode: forward to a key-holding proxy ---

#[derive(Clone)]
pub struct ProxyClient {
  client: reqwest::Client,
  base_url: String,
}

impl ProxyClient {
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("TRANSLINGO_PROXY_URL").ok()?;
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
    let url = format!("{}/api/v1/generate", self.base_url);
    let res = self.client.post(&url)
      .header(USER_AGENT, "translingo-backend/0.1")
      .json(&ProxyGenerateIn { prompt: prompt.to_string() })
      .send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let message = res.text().await.unwrap_or_default();
      return Err(GatewayError::Http { status, message });
    }

    let body: ProxyGenerateOut = res.json().await
      .map_err(|e| GatewayError::Parse(e.to_string()))?;
    if let Some(error) = body.error {
      return Err(GatewayError::Http { status: 200, message: error });
    }
    match body.ai_response {
      Some(text) if !text.trim().is_empty() => Ok(text),
      _ => Err(GatewayError::Empty),
    }
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest { contents: Vec<Content> }
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate { content: ContentResp }
#[derive(Deserialize)]
struct ContentResp {
  #[serde(default)] parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp { text: String }

#[derive(Serialize)]
struct ProxyGenerateIn { prompt: String }
#[derive(Deserialize)]
struct ProxyGenerateOut {
  #[serde(rename = "aiResponse")] ai_response: Option<String>,
  #[serde(default)] error: Option<String>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gemini_error_body_is_unwrapped() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("API key not valid"));
    assert_eq!(extract_gemini_error("plain text"), None);
  }

  #[test]
  fn proxy_reply_shapes_deserialize() {
    let ok: ProxyGenerateOut = serde_json::from_str(r#"{"aiResponse": "Hola mundo."}"#).unwrap();
    assert_eq!(ok.ai_response.as_deref(), Some("Hola mundo."));
    assert!(ok.error.is_none());

    let err: ProxyGenerateOut =
      serde_json::from_str(r#"{"aiResponse": null, "error": "quota exceeded"}"#).unwrap();
    assert_eq!(err.error.as_deref(), Some("quota exceeded"));
  }
}
