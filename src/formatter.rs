//! Combined, letter-prefixed rendering of the four choices, stored next to the structured list.

use crate::domain::{Language, ARABIC_LABELS};

/// Alphabet follows the answer label: Arabic letters if the label is one, Latin otherwise.
pub fn alphabet_for_answer(answer: &str) -> Language {
  if ARABIC_LABELS.contains(&answer) {
    Language::Arabic
  } else {
    Language::French
  }
}

pub fn combine_choices(choices: &[String; 4], answer: &str) -> String {
  alphabet_for_answer(answer)
    .labels()
    .iter()
    .zip(choices)
    .map(|(label, choice)| format!("{label}. {choice}"))
    .collect::<Vec<_>>()
    .join("\n")
}
