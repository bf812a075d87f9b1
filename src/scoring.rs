//! Time-adjusted scoring.
//!
//! The AI assigns a base score of 0–10 per translation; faster answers earn a
//! linear time bonus on top. `compute_score` is pure and deterministic so the
//! same review and elapsed time always fold into the totals the same way.

/// Tuning knobs for the time multiplier.
///
/// With the defaults the `min_multiplier` floor is inert: the unfloored
/// multiplier decays from 1.5 at zero seconds to exactly 1.0 at `max_time`
/// and never drops below it. The floor is kept as configured upstream.
#[derive(Clone, Copy, Debug)]
pub struct ScoreParams {
  /// Seconds after which no time bonus applies.
  pub max_time: f64,
  /// Maximum fractional bonus, granted at zero elapsed time.
  pub max_bonus: f64,
  /// Floor applied to the multiplier.
  pub min_multiplier: f64,
}

impl Default for ScoreParams {
  fn default() -> Self {
    Self { max_time: 30.0, max_bonus: 0.5, min_multiplier: 0.6 }
  }
}

/// Adjust a base score by a linearly decaying time bonus.
///
/// The bonus fraction is 1 for an instant answer and 0 at or beyond
/// `max_time`; the result is rounded to the nearest integer. Negative
/// `base_points` is not rejected and simply propagates through the formula.
pub fn compute_score(base_points: i64, elapsed_seconds: f64, params: &ScoreParams) -> i64 {
  let clamped_time = elapsed_seconds.max(0.0);
  // 1 when instant, 0 at max_time+
  let bonus_fraction = ((params.max_time - clamped_time) / params.max_time).max(0.0);
  let multiplier = (1.0 + params.max_bonus * bonus_fraction).max(params.min_multiplier);
  (base_points as f64 * multiplier).round() as i64
}
