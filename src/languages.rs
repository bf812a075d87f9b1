//! Built-in supported-language table.
//!
//! Reference data only: the game never mutates a language, it just picks a
//! source/target pair from this list. Codes are BCP 47 primary subtags.

use crate::domain::Language;

fn lang(code: &str, name: &str, native_name: &str) -> Language {
  Language { code: code.into(), name: name.into(), native_name: native_name.into() }
}

/// Languages the game offers in its selection control.
pub fn supported_languages() -> Vec<Language> {
  vec![
    lang("es", "Spanish", "Español"),
    lang("en", "English", "English"),
    lang("tr", "Turkish", "Türkçe"),
    lang("de", "German", "Deutsch"),
    lang("fr", "French", "Français"),
    lang("it", "Italian", "Italiano"),
    lang("pt", "Portuguese", "Português"),
    lang("nl", "Dutch", "Nederlands"),
    lang("sv", "Swedish", "Svenska"),
    lang("pl", "Polish", "Polski"),
  ]
}

/// Look a language up by code.
pub fn find_language(code: &str) -> Option<Language> {
  supported_languages().into_iter().find(|l| l.code == code)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn finds_known_codes() {
    let es = find_language("es").expect("es");
    assert_eq!(es.name, "Spanish");
    assert_eq!(es.native_name, "Español");
    assert!(find_language("xx").is_none());
  }

  #[test]
  fn codes_are_unique() {
    let langs = supported_languages();
    let mut codes: Vec<&str> = langs.iter().map(|l| l.code.as_str()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), langs.len());
  }
}
