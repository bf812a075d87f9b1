//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AiReview, Language, SessionTotals};
use crate::session::{Phase, Session};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        source: String,
        target: String,
    },
    NewText {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SubmitTranslation {
        #[serde(rename = "sessionId")]
        session_id: String,
        text: String,
    },
    Hint {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    PasteText {
        #[serde(rename = "sessionId")]
        session_id: String,
        text: String,
    },
    ConfirmPaste {
        #[serde(rename = "sessionId")]
        session_id: String,
        accept: bool,
    },
    NextRound {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SetLanguages {
        #[serde(rename = "sessionId")]
        session_id: String,
        source: String,
        target: String,
    },
    SwapLanguages {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionStarted {
        session: SessionOut,
    },
    Round {
        session: SessionOut,
    },
    Review {
        review: ReviewOut,
    },
    Hints {
        words: Vec<String>,
    },
    PasteConfirmationRequired {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Snapshot of one session, used by both WS and HTTP.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub source: Language,
    pub target: Language,
    pub phase: Phase,
    #[serde(rename = "sourceText")]
    pub source_text: String,
    #[serde(rename = "userTranslation")]
    pub user_translation: String,
    #[serde(rename = "hintWords")]
    pub hint_words: Vec<String>,
    #[serde(rename = "generationFailed")]
    pub generation_failed: bool,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: u64,
    pub totals: SessionTotals,
}

/// A completed review with its time-adjusted score and the new totals.
#[derive(Debug, Serialize)]
pub struct ReviewOut {
    pub review: AiReview,
    #[serde(rename = "adjustedScore")]
    pub adjusted_score: i64,
    /// Difference between the adjusted and the base score.
    #[serde(rename = "bonusFromTime")]
    pub bonus_from_time: i64,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: u64,
    pub totals: SessionTotals,
}

/// Convert the internal session machine to the public snapshot.
pub fn to_out(s: &Session) -> SessionOut {
    SessionOut {
        session_id: s.id.clone(),
        source: s.source().clone(),
        target: s.target().clone(),
        phase: s.phase(),
        source_text: s.round().source_text.clone(),
        user_translation: s.round().user_translation.clone(),
        hint_words: s.round().hint_words.clone(),
        generation_failed: s.generation_failed(),
        elapsed_seconds: s.elapsed_seconds(),
        totals: s.totals(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct CreateSessionIn {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRefIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslationIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PasteIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPasteIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetLanguagesIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub source: String,
    pub target: String,
}

#[derive(Serialize)]
pub struct LanguagesOut {
    pub languages: Vec<Language>,
}

#[derive(Serialize)]
pub struct HintsOut {
    pub words: Vec<String>,
}

// Proxy-mode collaborators: the generate endpoint and the key endpoint.

#[derive(Deserialize)]
pub struct GenerateIn {
    pub prompt: String,
}

#[derive(Serialize)]
pub struct GenerateOut {
    #[serde(rename = "aiResponse", skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct KeyOut {
    #[serde(rename = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
