//! Decoding structured replies from the model.
//!
//! The upstream model may wrap JSON in Markdown code fences despite being
//! told not to, so decoding is a dedicated step: strip fence markers, parse,
//! and shape-check through serde. Any field-shape mismatch is a parse
//! failure; we never accept a partially valid review.

use serde::de::DeserializeOwned;

use crate::gateway::GatewayError;

/// Remove Markdown code-fence markers (```json / ```) and trim.
pub fn strip_code_fences(raw: &str) -> String {
  raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a possibly-fenced JSON reply into `T`.
pub fn decode_fenced_json<T: DeserializeOwned>(raw: &str) -> Result<T, GatewayError> {
  let cleaned = strip_code_fences(raw);
  serde_json::from_str::<T>(&cleaned).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Shape of the hint-word reply: `{ "words": ["...", ...] }`.
#[derive(Debug, serde::Deserialize)]
pub struct HintWords {
  pub words: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::AiReview;

  const REVIEW_JSON: &str = r#"{
    "score": 7,
    "scoreText": "Good translation overall.",
    "grammarErrors": ["Minor word order error"],
    "improvements": ["Use a more natural expression"],
    "correctTranslation": "Hello world.",
    "encouragement": "Keep going!"
  }"#;

  #[test]
  fn decodes_unfenced_review() {
    let r: AiReview = decode_fenced_json(REVIEW_JSON).expect("review");
    assert_eq!(r.score, 7);
    assert_eq!(r.grammar_errors.len(), 1);
    assert_eq!(r.correct_translation, "Hello world.");
  }

  #[test]
  fn decodes_review_inside_json_fence() {
    let fenced = format!("```json\n{}\n```", REVIEW_JSON);
    let r: AiReview = decode_fenced_json(&fenced).expect("review");
    assert_eq!(r.score, 7);
  }

  #[test]
  fn decodes_review_inside_bare_fence_with_padding() {
    let fenced = format!("\n```\n{}\n```\n", REVIEW_JSON);
    let r: AiReview = decode_fenced_json(&fenced).expect("review");
    assert_eq!(r.score_text, "Good translation overall.");
  }

  #[test]
  fn rejects_truncated_json() {
    let truncated = &REVIEW_JSON[..REVIEW_JSON.len() - 5];
    let err = decode_fenced_json::<AiReview>(truncated).unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
  }

  #[test]
  fn rejects_prose() {
    let err = decode_fenced_json::<AiReview>("Sorry, I cannot evaluate that.").unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
  }

  #[test]
  fn rejects_field_shape_mismatch() {
    // score as a string is a shape error, not a silent zero
    let bad = REVIEW_JSON.replacen("7", "\"seven\"", 1);
    let err = decode_fenced_json::<AiReview>(&bad).unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
  }

  #[test]
  fn decodes_hint_words() {
    let raw = "```json\n{\"words\": [\"hola\", \"mundo\"]}\n```";
    let h: HintWords = decode_fenced_json(raw).expect("words");
    assert_eq!(h.words, vec!["hola", "mundo"]);
  }

  #[test]
  fn strip_removes_all_fence_markers() {
    assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("  {}  "), "{}");
  }
}
