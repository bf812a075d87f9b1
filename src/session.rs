//! The round state machine.
//!
//! A session sequences text generation → user translation → AI review →
//! scoring → next round. All methods here are synchronous; the gateway I/O
//! lives in `logic`, which takes a request token out before awaiting and
//! re-applies the result afterwards. Completions carrying a stale token are
//! discarded silently, so a double submit or a reply that lands after the
//! user moved on can never touch the wrong round.

use std::time::Instant;

use serde::Serialize;

use crate::domain::{AiReview, Language, Round, SessionTotals};
use crate::scoring::{compute_score, ScoreParams};

/// Submissions below this trimmed length are rejected before any network call.
pub const MIN_TRANSLATION_CHARS: usize = 10;
/// Pasted text must be strictly longer than this to replace the source text.
pub const MIN_PASTE_CHARS: usize = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Idle,
  GeneratingText,
  AwaitingTranslation,
  Reviewing,
  ShowingReview,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("please write your translation ({len} of {min} characters minimum)")]
  TranslationTooShort { len: usize, min: usize },
  #[error("your text must be longer than {min} characters (got {len})")]
  PasteTooShort { len: usize, min: usize },
  #[error("no pasted text is awaiting confirmation")]
  NoPendingPaste,
  #[error("operation not allowed while {phase:?}")]
  WrongPhase { phase: Phase },
  #[error("source and target language must differ")]
  SameLanguagePair,
  #[error("unknown language code: {0}")]
  UnknownLanguage(String),
  #[error("AI credential not configured")]
  Configuration,
  #[error("unknown session id")]
  UnknownSession,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
  Running,
  Stopped,
}

/// Elapsed-seconds counter. Starting always resets to 0; stopping freezes
/// the count so the review folds in the time the user actually spent.
#[derive(Clone, Debug)]
pub struct Timer {
  state: TimerState,
  started_at: Option<Instant>,
  frozen_secs: u64,
}

impl Timer {
  fn new() -> Self {
    Self { state: TimerState::Stopped, started_at: None, frozen_secs: 0 }
  }

  pub fn start(&mut self) {
    self.state = TimerState::Running;
    self.started_at = Some(Instant::now());
    self.frozen_secs = 0;
  }

  pub fn stop(&mut self) {
    self.frozen_secs = self.elapsed_seconds();
    self.state = TimerState::Stopped;
    self.started_at = None;
  }

  pub fn state(&self) -> TimerState {
    self.state
  }

  pub fn elapsed_seconds(&self) -> u64 {
    match self.state {
      TimerState::Running => self.started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0),
      TimerState::Stopped => self.frozen_secs,
    }
  }

  /// Pretend the timer started `secs` ago.
  #[cfg(test)]
  pub(crate) fn backdate(&mut self, secs: u64) {
    if let Some(t) = self.started_at {
      self.started_at = Some(t - std::time::Duration::from_secs(secs));
    }
  }
}

/// One user's game: language pair, the active round, cumulative totals.
/// Memory-only; dropped with the process.
pub struct Session {
  pub id: String,
  source: Language,
  target: Language,
  phase: Phase,
  round: Round,
  review: Option<AiReview>,
  adjusted_score: Option<i64>,
  totals: SessionTotals,
  timer: Timer,
  generation_failed: bool,
  pending_paste: Option<String>,
  /// Bumped on every transition that replaces the round; in-flight results
  /// from an earlier round carry the old value and are dropped on arrival.
  round_token: u64,
  score_params: ScoreParams,
}

impl Session {
  pub fn new(id: String, source: Language, target: Language) -> Result<Self, SessionError> {
    if source.code == target.code {
      return Err(SessionError::SameLanguagePair);
    }
    Ok(Self {
      id,
      source,
      target,
      phase: Phase::Idle,
      round: Round::default(),
      review: None,
      adjusted_score: None,
      totals: SessionTotals::default(),
      timer: Timer::new(),
      generation_failed: false,
      pending_paste: None,
      round_token: 0,
      score_params: ScoreParams::default(),
    })
  }

  // --- Accessors ---

  pub fn source(&self) -> &Language { &self.source }
  pub fn target(&self) -> &Language { &self.target }
  pub fn phase(&self) -> Phase { self.phase }
  pub fn round(&self) -> &Round { &self.round }
  pub fn review(&self) -> Option<&AiReview> { self.review.as_ref() }
  pub fn adjusted_score(&self) -> Option<i64> { self.adjusted_score }
  pub fn totals(&self) -> SessionTotals { self.totals }
  pub fn elapsed_seconds(&self) -> u64 { self.timer.elapsed_seconds() }
  pub fn generation_failed(&self) -> bool { self.generation_failed }

  #[cfg(test)]
  pub(crate) fn timer_mut(&mut self) -> &mut Timer { &mut self.timer }

  // --- Text generation ---

  /// Enter GeneratingText from any phase (initial load, language change, or
  /// explicit retry). Returns the token the completion must present.
  pub fn begin_generation(&mut self) -> u64 {
    self.round_token += 1;
    self.phase = Phase::GeneratingText;
    self.generation_failed = false;
    self.round.hint_words.clear();
    self.timer.stop();
    self.round_token
  }

  /// Store a freshly generated source text and start the round. Returns
  /// false when the completion is stale.
  pub fn apply_source_text(&mut self, token: u64, text: String) -> bool {
    if token != self.round_token {
      return false;
    }
    self.round = Round { source_text: text, ..Round::default() };
    self.review = None;
    self.adjusted_score = None;
    self.generation_failed = false;
    self.timer.start();
    self.phase = Phase::AwaitingTranslation;
    true
  }

  /// Generation failed: land in the error-flagged AwaitingTranslation
  /// variant the caller may retry from.
  pub fn fail_generation(&mut self, token: u64) -> bool {
    if token != self.round_token {
      return false;
    }
    self.round.user_translation.clear();
    self.review = None;
    self.adjusted_score = None;
    self.generation_failed = true;
    self.phase = Phase::AwaitingTranslation;
    true
  }

  // --- Translation submission and review ---

  /// Accept the user's translation and freeze the clock. Rejects trimmed
  /// input shorter than `MIN_TRANSLATION_CHARS` synchronously, with no state
  /// change and no network call.
  pub fn submit_translation(&mut self, text: &str) -> Result<u64, SessionError> {
    if self.phase != Phase::AwaitingTranslation {
      return Err(SessionError::WrongPhase { phase: self.phase });
    }
    let len = text.trim().chars().count();
    if len < MIN_TRANSLATION_CHARS {
      return Err(SessionError::TranslationTooShort { len, min: MIN_TRANSLATION_CHARS });
    }
    self.round.user_translation = text.to_string();
    self.round.hint_words.clear();
    self.timer.stop();
    self.phase = Phase::Reviewing;
    Ok(self.round_token)
  }

  /// Fold a review into the session: compute the time-adjusted score and
  /// update the cumulative totals. This is the only place totals mutate.
  pub fn apply_review(&mut self, token: u64, review: AiReview) -> bool {
    if token != self.round_token || self.phase != Phase::Reviewing {
      return false;
    }
    let adjusted = compute_score(review.score, self.timer.elapsed_seconds() as f64, &self.score_params);
    self.totals.total_score += adjusted;
    self.totals.translation_count += 1;
    self.adjusted_score = Some(adjusted);
    self.review = Some(review);
    self.phase = Phase::ShowingReview;
    true
  }

  /// Review failed: discard partial state and return to AwaitingTranslation
  /// with the review unset. Totals are untouched.
  pub fn fail_review(&mut self, token: u64) -> bool {
    if token != self.round_token || self.phase != Phase::Reviewing {
      return false;
    }
    self.review = None;
    self.adjusted_score = None;
    self.phase = Phase::AwaitingTranslation;
    true
  }

  // --- Hints (side channel; never touches the timer or the translation) ---

  pub fn hint_token(&self) -> u64 {
    self.round_token
  }

  pub fn apply_hint_words(&mut self, token: u64, words: Vec<String>) -> bool {
    if token != self.round_token || self.phase != Phase::AwaitingTranslation {
      return false;
    }
    self.round.hint_words = words;
    true
  }

  pub fn fail_hints(&mut self, token: u64) -> bool {
    if token != self.round_token {
      return false;
    }
    self.round.hint_words.clear();
    true
  }

  // --- Paste override ---

  /// Stage externally-sourced text to replace the generated source text.
  /// The actual replacement waits for an explicit confirmation.
  pub fn request_paste(&mut self, text: String) -> Result<(), SessionError> {
    let len = text.chars().count();
    if len <= MIN_PASTE_CHARS {
      return Err(SessionError::PasteTooShort { len, min: MIN_PASTE_CHARS });
    }
    self.pending_paste = Some(text);
    Ok(())
  }

  /// Resolve the staged paste. Confirmation replaces the source text
  /// directly, bypassing the gateway, and resets the clock to 0.
  pub fn confirm_paste(&mut self, accept: bool) -> Result<bool, SessionError> {
    let Some(text) = self.pending_paste.take() else {
      return Err(SessionError::NoPendingPaste);
    };
    if !accept {
      return Ok(false);
    }
    self.round_token += 1;
    self.round = Round { source_text: text, ..Round::default() };
    self.review = None;
    self.adjusted_score = None;
    self.generation_failed = false;
    self.timer.start();
    self.phase = Phase::AwaitingTranslation;
    Ok(true)
  }

  // --- Round and language lifecycle ---

  /// Discard the completed round; the caller regenerates afterwards.
  pub fn next_round(&mut self) -> Result<(), SessionError> {
    if self.phase != Phase::ShowingReview {
      return Err(SessionError::WrongPhase { phase: self.phase });
    }
    self.round = Round::default();
    self.review = None;
    self.adjusted_score = None;
    self.phase = Phase::Idle;
    Ok(())
  }

  pub fn set_languages(&mut self, source: Language, target: Language) -> Result<(), SessionError> {
    if source.code == target.code {
      return Err(SessionError::SameLanguagePair);
    }
    self.source = source;
    self.target = target;
    Ok(())
  }

  pub fn swap_languages(&mut self) {
    std::mem::swap(&mut self.source, &mut self.target);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::languages::find_language;

  fn review(score: i64) -> AiReview {
    AiReview {
      score,
      score_text: "Very good translation!".into(),
      grammar_errors: vec![],
      improvements: vec![],
      correct_translation: "Hello world.".into(),
      encouragement: "Keep it up!".into(),
    }
  }

  fn session() -> Session {
    Session::new(
      "s1".into(),
      find_language("es").unwrap(),
      find_language("en").unwrap(),
    )
    .unwrap()
  }

  #[test]
  fn same_language_pair_is_rejected() {
    let es = find_language("es").unwrap();
    assert!(matches!(
      Session::new("s1".into(), es.clone(), es),
      Err(SessionError::SameLanguagePair)
    ));
  }

  #[test]
  fn full_round_scores_and_updates_totals() {
    let mut s = session();
    let token = s.begin_generation();
    assert_eq!(s.phase(), Phase::GeneratingText);
    assert!(s.apply_source_text(token, "Hola mundo.".into()));
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
    assert_eq!(s.timer.state(), TimerState::Running);

    s.timer_mut().backdate(10);
    let token = s.submit_translation("Hello, world").expect("12 chars");
    assert_eq!(s.phase(), Phase::Reviewing);
    assert_eq!(s.elapsed_seconds(), 10);

    assert!(s.apply_review(token, review(7)));
    assert_eq!(s.phase(), Phase::ShowingReview);
    // round(7 * (1 + 0.5 * 20/30)) = 9
    assert_eq!(s.adjusted_score(), Some(9));
    assert_eq!(s.totals().total_score, 9);
    assert_eq!(s.totals().translation_count, 1);
  }

  #[test]
  fn short_translation_is_rejected_without_a_state_change() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());

    let err = s.submit_translation("  123456789  ").unwrap_err();
    assert!(matches!(err, SessionError::TranslationTooShort { len: 9, .. }));
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
    assert_eq!(s.timer.state(), TimerState::Running);

    // exactly 10 trimmed characters proceeds
    assert!(s.submit_translation("1234567890").is_ok());
    assert_eq!(s.phase(), Phase::Reviewing);
  }

  #[test]
  fn review_failure_returns_to_awaiting_with_review_unset() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());
    let token = s.submit_translation("Hello, world").unwrap();

    assert!(s.fail_review(token));
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
    assert!(s.review().is_none());
    assert_eq!(s.adjusted_score(), None);
    assert_eq!(s.totals().translation_count, 0);
  }

  #[test]
  fn stale_review_is_discarded_silently() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());
    let review_token = s.submit_translation("Hello, world").unwrap();

    // The user moves on before the review lands.
    let gen_token = s.begin_generation();
    s.apply_source_text(gen_token, "Buenos días a todos.".into());

    assert!(!s.apply_review(review_token, review(10)));
    assert_eq!(s.totals().translation_count, 0);
    assert!(s.review().is_none());
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
  }

  #[test]
  fn stale_source_text_is_discarded_silently() {
    let mut s = session();
    let old = s.begin_generation();
    let new = s.begin_generation();
    assert!(!s.apply_source_text(old, "late reply".into()));
    assert_eq!(s.phase(), Phase::GeneratingText);
    assert!(s.apply_source_text(new, "fresh reply".into()));
    assert_eq!(s.round().source_text, "fresh reply");
  }

  #[test]
  fn generation_failure_flags_a_retryable_state() {
    let mut s = session();
    let token = s.begin_generation();
    assert!(s.fail_generation(token));
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
    assert!(s.generation_failed());

    // retry clears the flag
    let token = s.begin_generation();
    assert!(!s.generation_failed());
    s.apply_source_text(token, "Hola mundo.".into());
    assert!(!s.generation_failed());
  }

  #[test]
  fn hints_apply_only_to_the_current_round() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());

    let hints = s.hint_token();
    assert!(s.apply_hint_words(hints, vec!["hello".into(), "world".into()]));
    assert_eq!(s.round().hint_words.len(), 2);

    // hint words cleared whenever the source text changes
    let token = s.begin_generation();
    assert!(s.round().hint_words.is_empty());
    s.apply_source_text(token, "Otra frase corta.".into());
    assert!(!s.apply_hint_words(hints, vec!["stale".into()]));
    assert!(s.round().hint_words.is_empty());
  }

  #[test]
  fn hint_failure_clears_words() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());
    let hints = s.hint_token();
    s.apply_hint_words(hints, vec!["hello".into()]);
    assert!(s.fail_hints(hints));
    assert!(s.round().hint_words.is_empty());
  }

  #[test]
  fn paste_requires_length_then_confirmation() {
    let mut s = session();
    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());
    s.timer_mut().backdate(20);

    let short = "x".repeat(150);
    assert!(matches!(
      s.request_paste(short),
      Err(SessionError::PasteTooShort { len: 150, .. })
    ));
    assert!(matches!(s.confirm_paste(true), Err(SessionError::NoPendingPaste)));

    // declining keeps the generated text
    let long = "y".repeat(151);
    s.request_paste(long.clone()).unwrap();
    assert!(!s.confirm_paste(false).unwrap());
    assert_eq!(s.round().source_text, "Hola mundo.");

    s.request_paste(long.clone()).unwrap();
    assert!(s.confirm_paste(true).unwrap());
    assert_eq!(s.round().source_text, long);
    assert_eq!(s.elapsed_seconds(), 0);
    assert_eq!(s.phase(), Phase::AwaitingTranslation);
  }

  #[test]
  fn next_round_only_from_showing_review() {
    let mut s = session();
    assert!(matches!(s.next_round(), Err(SessionError::WrongPhase { .. })));

    let token = s.begin_generation();
    s.apply_source_text(token, "Hola mundo.".into());
    let token = s.submit_translation("Hello, world").unwrap();
    s.apply_review(token, review(5));

    s.next_round().unwrap();
    assert!(s.review().is_none());
    assert!(s.round().source_text.is_empty());
    // totals survive the round change
    assert_eq!(s.totals().translation_count, 1);
  }

  #[test]
  fn swapping_languages_twice_restores_the_pair() {
    let mut s = session();
    let (src, tgt) = (s.source().clone(), s.target().clone());
    s.swap_languages();
    assert_eq!(s.source().code, tgt.code);
    assert_eq!(s.target().code, src.code);
    s.swap_languages();
    assert_eq!(s.source(), &src);
    assert_eq!(s.target(), &tgt);
  }

  #[test]
  fn totals_are_monotonically_non_decreasing() {
    let mut s = session();
    let mut last = s.totals();
    for text in ["Primera frase corta.", "Segunda frase corta."] {
      let token = s.begin_generation();
      s.apply_source_text(token, text.into());
      let token = s.submit_translation("A short sentence.").unwrap();
      s.apply_review(token, review(6));
      let now = s.totals();
      assert!(now.total_score >= last.total_score);
      assert!(now.translation_count > last.translation_count);
      last = now;
      s.next_round().unwrap();
    }
  }
}
