//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Each operation takes the request token out of the session, awaits the
//! gateway with no lock held, and re-applies the result under the lock. A
//! failed gateway call is terminal for that one operation: the session lands
//! in a safe state and the user re-triggers explicitly. Nothing here is
//! fatal to the process.

use tracing::{error, info, instrument};

use crate::gateway::GatewayError;
use crate::protocol::{to_out, ReviewOut, SessionOut};
use crate::session::SessionError;
use crate::state::{lookup, AppState};

pub const PASTE_CONFIRMATION_TEXT: &str =
  "You will paste a text for translation instead of AI generated text. Are you sure?";

/// Operation outcome surfaced to the user. Validation errors carry their own
/// wording; gateway failures all read as "unavailable, try again".
#[derive(Debug, thiserror::Error)]
pub enum OpError {
  #[error("{0}")]
  Session(#[from] SessionError),
  #[error("The AI service is currently unavailable. Please try again later.")]
  Gateway(#[from] GatewayError),
  #[error("the round changed before the result arrived; it was discarded")]
  Stale,
}

/// Create a session and generate its first source text.
#[instrument(level = "info", skip(state))]
pub async fn start_session(
  state: &AppState,
  source: &str,
  target: &str,
) -> Result<SessionOut, OpError> {
  let id = state.create_session(source, target).await?;
  generate_round(state, &id).await
}

/// Fetch a fresh source text for the session (initial load, retry, or after
/// a language change). On failure the session is left in the error-flagged
/// awaiting state so the caller may retry.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn generate_round(state: &AppState, session_id: &str) -> Result<SessionOut, OpError> {
  let (token, source) = state
    .with_session(session_id, |s| (s.begin_generation(), s.source().clone()))
    .await?;

  let gateway = state.gateway()?.clone();
  match gateway.generate_source_text(&state.prompts, &source).await {
    Ok(text) => {
      let applied = state
        .with_session(session_id, |s| s.apply_source_text(token, text))
        .await?;
      if !applied {
        info!(target: "session", %session_id, "Stale source text discarded");
      }
    }
    Err(e) => {
      error!(target: "session", %session_id, error = %e, "Source text generation failed");
      state
        .with_session(session_id, |s| s.fail_generation(token))
        .await?;
      return Err(e.into());
    }
  }

  Ok(state.with_session(session_id, |s| to_out(s)).await?)
}

/// Submit the user's translation for review and fold the result into the
/// session totals.
#[instrument(level = "info", skip(state, text), fields(%session_id, translation_len = text.len()))]
pub async fn submit_translation(
  state: &AppState,
  session_id: &str,
  text: &str,
) -> Result<ReviewOut, OpError> {
  let (token, source, target, source_text) = state
    .with_session(session_id, |s| {
      let token = s.submit_translation(text)?;
      Ok::<_, SessionError>((
        token,
        s.source().clone(),
        s.target().clone(),
        s.round().source_text.clone(),
      ))
    })
    .await??;

  let gateway = state.gateway()?.clone();
  let review = match gateway
    .review_translation(&state.prompts, &source, &target, &source_text, text)
    .await
  {
    Ok(review) => review,
    Err(e) => {
      error!(target: "session", %session_id, error = %e, "AI review failed");
      state
        .with_session(session_id, |s| s.fail_review(token))
        .await?;
      return Err(e.into());
    }
  };

  let base_score = review.score;
  let out = state
    .with_session(session_id, |s| {
      if !s.apply_review(token, review.clone()) {
        return None;
      }
      let adjusted = s.adjusted_score().unwrap_or(base_score);
      Some(ReviewOut {
        review,
        adjusted_score: adjusted,
        bonus_from_time: adjusted - base_score,
        elapsed_seconds: s.elapsed_seconds(),
        totals: s.totals(),
      })
    })
    .await?;

  match out {
    Some(review_out) => {
      info!(
        target: "session",
        %session_id,
        score = review_out.review.score,
        adjusted = review_out.adjusted_score,
        "Review applied"
      );
      Ok(review_out)
    }
    None => {
      info!(target: "session", %session_id, "Stale review discarded");
      Err(OpError::Stale)
    }
  }
}

/// Side-channel hint request: translate-and-extract keywords over the
/// current source text. Never touches the timer or the translation.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn request_hints(state: &AppState, session_id: &str) -> Result<Vec<String>, OpError> {
  let (token, source, target, source_text, phase) = state
    .with_session(session_id, |s| {
      (
        s.hint_token(),
        s.source().clone(),
        s.target().clone(),
        s.round().source_text.clone(),
        s.phase(),
      )
    })
    .await?;

  if source_text.is_empty() {
    return Err(SessionError::WrongPhase { phase }.into());
  }

  let gateway = state.gateway()?.clone();
  match gateway
    .hint_words(&state.prompts, &source, &target, &source_text)
    .await
  {
    Ok(words) => {
      let applied = state
        .with_session(session_id, |s| s.apply_hint_words(token, words.clone()))
        .await?;
      if !applied {
        info!(target: "session", %session_id, "Stale hint words discarded");
        return Err(OpError::Stale);
      }
      Ok(words)
    }
    Err(e) => {
      error!(target: "session", %session_id, error = %e, "Hint generation failed");
      state
        .with_session(session_id, |s| s.fail_hints(token))
        .await?;
      Err(e.into())
    }
  }
}

/// Stage a pasted text; the caller must confirm before it replaces the
/// generated source text.
#[instrument(level = "info", skip(state, text), fields(%session_id, text_len = text.len()))]
pub async fn paste_text(
  state: &AppState,
  session_id: &str,
  text: String,
) -> Result<&'static str, OpError> {
  state
    .with_session(session_id, |s| s.request_paste(text))
    .await??;
  Ok(PASTE_CONFIRMATION_TEXT)
}

/// Resolve a staged paste. Accepting bypasses the gateway and resets the
/// clock; declining keeps the current round untouched.
#[instrument(level = "info", skip(state), fields(%session_id, accept))]
pub async fn confirm_paste(
  state: &AppState,
  session_id: &str,
  accept: bool,
) -> Result<SessionOut, OpError> {
  state
    .with_session(session_id, |s| s.confirm_paste(accept).map(|_| to_out(s)))
    .await?
    .map_err(Into::into)
}

/// Discard the completed round and generate the next one.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn next_round(state: &AppState, session_id: &str) -> Result<SessionOut, OpError> {
  state
    .with_session(session_id, |s| s.next_round())
    .await??;
  generate_round(state, session_id).await
}

/// Change the language pair and regenerate the source text.
#[instrument(level = "info", skip(state), fields(%session_id, %source, %target))]
pub async fn set_languages(
  state: &AppState,
  session_id: &str,
  source: &str,
  target: &str,
) -> Result<SessionOut, OpError> {
  let source = lookup(source)?;
  let target = lookup(target)?;
  state
    .with_session(session_id, |s| s.set_languages(source, target))
    .await??;
  generate_round(state, session_id).await
}

/// Swap source and target and regenerate. Swapping twice returns to the
/// original pair.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn swap_languages(state: &AppState, session_id: &str) -> Result<SessionOut, OpError> {
  state
    .with_session(session_id, |s| s.swap_languages())
    .await?;
  generate_round(state, session_id).await
}

/// Read-only snapshot for pollers.
#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn snapshot(state: &AppState, session_id: &str) -> Result<SessionOut, OpError> {
  Ok(state.with_session(session_id, |s| to_out(s)).await?)
}
