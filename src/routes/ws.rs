//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "translingo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "translingo_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "translingo_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "translingo_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "translingo_backend", "WebSocket disconnected");
}

fn err_reply(e: impl std::fmt::Display) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { source, target } => {
      match logic::start_session(state, &source, &target).await {
        Ok(session) => {
          tracing::info!(target: "session", id = %session.session_id, "WS session started");
          ServerWsMessage::SessionStarted { session }
        }
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::NewText { session_id } => {
      match logic::generate_round(state, &session_id).await {
        Ok(session) => ServerWsMessage::Round { session },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::SubmitTranslation { session_id, text } => {
      match logic::submit_translation(state, &session_id, &text).await {
        Ok(review) => {
          tracing::info!(target: "session", id = %session_id, adjusted = review.adjusted_score, "WS translation reviewed");
          ServerWsMessage::Review { review }
        }
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::Hint { session_id } => {
      match logic::request_hints(state, &session_id).await {
        Ok(words) => ServerWsMessage::Hints { words },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::PasteText { session_id, text } => {
      match logic::paste_text(state, &session_id, text).await {
        Ok(message) => ServerWsMessage::PasteConfirmationRequired { message: message.into() },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::ConfirmPaste { session_id, accept } => {
      match logic::confirm_paste(state, &session_id, accept).await {
        Ok(session) => ServerWsMessage::Round { session },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::NextRound { session_id } => {
      match logic::next_round(state, &session_id).await {
        Ok(session) => ServerWsMessage::Round { session },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::SetLanguages { session_id, source, target } => {
      match logic::set_languages(state, &session_id, &source, &target).await {
        Ok(session) => ServerWsMessage::Round { session },
        Err(e) => err_reply(e),
      }
    }

    ClientWsMessage::SwapLanguages { session_id } => {
      match logic::swap_languages(state, &session_id).await {
        Ok(session) => ServerWsMessage::Round { session },
        Err(e) => err_reply(e),
      }
    }
  }
}
