//! Domain models: detected language, answer alphabets, and the generated MCQ record.

use serde::{Deserialize, Serialize};

pub const ARABIC_LABELS: [&str; 4] = ["أ", "ب", "ج", "د"];
pub const FRENCH_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Language of the source text; drives prompt template, default difficulty and answer alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
  Arabic,
  French,
}

impl Language {
  /// Option prefixes the model is asked to use, in order.
  pub fn labels(self) -> [&'static str; 4] {
    match self {
      Language::Arabic => ARABIC_LABELS,
      Language::French => FRENCH_LABELS,
    }
  }

  /// Difficulty used when the caller does not send one.
  pub fn default_difficulty(self) -> &'static str {
    match self {
      Language::Arabic => "سهل",
      Language::French => "facile",
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Language::Arabic => "ar",
      Language::French => "fr",
    }
  }
}

/// Validated input for one generation call.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub text: String,
  pub level: u32,
  pub difficulty: Option<String>,
  pub source_text_id: Option<i64>,
}

/// Structured fields recovered from the model's reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedQcm {
  pub question: String,
  pub choices: [String; 4],
  pub answer: String,
}

/// Record handed to storage and returned to the caller.
/// `combined_choices` always mirrors `choices` in the alphabet of `answer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct McqRecord {
  pub question: String,
  pub choices: [String; 4],
  pub answer: String,
  pub combined_choices: String,
  pub source_text_id: Option<i64>,
}
