//! Source-text language detection.

use crate::domain::Language;

fn is_arabic(ch: char) -> bool {
  ('\u{0600}'..='\u{06FF}').contains(&ch)
}

/// Arabic as soon as one character falls in the Arabic block, French otherwise.
pub fn detect(text: &str) -> Language {
  if text.chars().any(is_arabic) {
    Language::Arabic
  } else {
    Language::French
  }
}
