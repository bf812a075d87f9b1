//! Domain models: languages, rounds, AI reviews, and session totals.

use serde::{Deserialize, Serialize};

/// Immutable language reference data. Selected, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
  pub code: String,
  pub name: String,
  #[serde(rename = "nativeName")]
  pub native_name: String,
}

/// One source-text/translation/review cycle. Replaced wholesale on
/// "next translation", language change, or confirmed paste.
#[derive(Clone, Debug, Default)]
pub struct Round {
  pub source_text: String,
  pub user_translation: String,
  /// Vocabulary clues for the target language, shown on demand.
  /// Cleared whenever the source text changes.
  pub hint_words: Vec<String>,
}

/// Evaluation produced once per round by the AI gateway.
/// Immutable once set; cleared when a new round starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiReview {
  /// Integer between 0 and 10 per the review prompt contract.
  pub score: i64,
  #[serde(rename = "scoreText")]
  pub score_text: String,
  #[serde(rename = "grammarErrors")]
  pub grammar_errors: Vec<String>,
  pub improvements: Vec<String>,
  #[serde(rename = "correctTranslation")]
  pub correct_translation: String,
  pub encouragement: String,
}

/// Session-wide aggregates. Monotonically non-decreasing; reset only by a
/// process restart (there is no persistence layer).
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SessionTotals {
  #[serde(rename = "totalScore")]
  pub total_score: i64,
  #[serde(rename = "translationCount")]
  pub translation_count: u64,
}
