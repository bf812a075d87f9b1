//! Loading prompt configuration from TOML.
//!
//! The three prompt templates are the actual protocol with the AI. Defaults
//! are built in; `TRANSLINGO_CONFIG_PATH` may point to a TOML file overriding
//! them (to tune tone/structure without a rebuild).

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates used by the gateway. Placeholders are filled with
/// `util::fill_template`; see each template for its keys.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  /// Keys: {native_name}, {code}
  pub source_text_template: String,
  /// Keys: {source_name}, {source_code}, {target_name}, {target_code}, {source_text}
  pub hint_words_template: String,
  /// Keys: {source_native_name}, {source_code}, {target_native_name}, {source_text}, {user_translation}
  pub review_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      source_text_template: "\
Create a text in {native_name} ({code}). The text should have these characteristics:\n\
- Be 2-4 sentences long\n\
- Can be about any topics randomly (e.g., food, travel, hobbies, family, work, sports, music, books, movies, nature, city life, quotes etc.)\n\
- The level of text can be intermediate or slightly above\n\
- Be translatable and understandable\n\
- Only provide the text, no other explanations".into(),

      hint_words_template: "\
Examine the text that I will give you. A user in my app will try to translate it from \
{source_name} ({source_code}) language to {target_name} ({target_code}) language. \
Output words or collocations in {target_name} ({target_code}) that can serve as clues for the user.\n\
Json format:\n\
{\n\
  \"words\": [\"word1\", \"word2\"]\n\
}\n\
Rules:\n\
- Only respond in JSON format, no other explanations\n\
Text: {source_text}".into(),

      review_template: "\
Read the following text in {source_native_name} ({source_code}):\n\
\"{source_text}\"\n\
\n\
User's translation to {target_native_name}:\n\
\"{user_translation}\"\n\
\n\
Please evaluate the user's translation and respond in the following JSON format:\n\
\n\
{\n\
  \"score\": 8,\n\
  \"scoreText\": \"Very good translation!\",\n\
  \"grammarErrors\": [\n\
    \"Minor word order error\"\n\
  ],\n\
  \"improvements\": [\n\
    \"You could use a more natural expression\",\n\
    \"Some words could be replaced with more appropriate ones\"\n\
  ],\n\
  \"correctTranslation\": \"The correct translation of this text should be...\",\n\
  \"encouragement\": \"Overall, you made a successful translation!\"\n\
}\n\
\n\
Rules:\n\
- score: integer between 0-10\n\
- scoreText: brief evaluation (1-2 sentences)\n\
- grammarErrors: string array if errors exist, empty array [] if none\n\
- improvements: string array of improvement suggestions\n\
- correctTranslation: suggested correct translation\n\
- encouragement: encouraging message\n\
- Write all text in English\n\
- Only respond in JSON format, no other explanations".into(),
    }
  }
}

/// Attempt to load `GameConfig` from TRANSLINGO_CONFIG_PATH. On any
/// parsing/IO error, returns None and the defaults stay in effect.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("TRANSLINGO_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "translingo_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "translingo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "translingo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
