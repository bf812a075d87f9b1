//! Small utility helpers used across modules.

use rand::seq::SliceRandom;

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Uniformly shuffled copy of a word list.
/// Hint words are shown in random order so their sequence doesn't mirror
/// the source text.
pub fn shuffled(mut words: Vec<String>) -> Vec<String> {
  let mut rng = rand::thread_rng();
  words.shuffle(&mut rng);
  words
}

/// "mm:ss" rendering of an elapsed-seconds counter.
#[allow(dead_code)]
pub fn formatted_seconds(seconds: u64) -> String {
  let mins = seconds / 60;
  let secs = seconds % 60;
  format!("{:02}:{:02}", mins, secs)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {b}, then {a} again", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y, then x again");
  }

  #[test]
  fn fill_template_leaves_unknown_keys_alone() {
    let out = fill_template("{a} {missing}", &[("a", "x")]);
    assert_eq!(out, "x {missing}");
  }

  #[test]
  fn shuffled_is_a_permutation() {
    let words: Vec<String> = ["casa", "perro", "gato", "libro", "sol", "luna"]
      .iter()
      .map(|w| w.to_string())
      .collect();
    let out = shuffled(words.clone());
    let mut a = words;
    let mut b = out;
    a.sort();
    b.sort();
    assert_eq!(a, b);
  }

  #[test]
  fn formatted_seconds_pads_both_fields() {
    assert_eq!(formatted_seconds(0), "00:00");
    assert_eq!(formatted_seconds(9), "00:09");
    assert_eq!(formatted_seconds(75), "01:15");
    assert_eq!(formatted_seconds(600), "10:00");
  }
}
