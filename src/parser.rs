//! Recovers a structured MCQ from the model's free-text reply.
//!
//! Matching is line/pattern based rather than anchored to the whole document, so prose
//! before or after the block is ignored. The Arabic layout is tried first, then the French
//! one. Missing pieces are never filled in: the caller gets a `ParseError` with the raw text.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::ParsedQcm;
use crate::util::trunc_for_log;

const RAW_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Error)]
#[error("Failed to parse QCM structure from model response: {}", trunc_for_log(.raw, RAW_PREVIEW_CHARS))]
pub struct ParseError {
  /// Full model reply, kept for diagnosing prompt/format drift.
  pub raw: String,
}

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"));

static AR_QUESTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"السؤال:\s*(.+)").expect("arabic question regex"));
// Option markers only count at the start of a line (after an optional list bullet),
// and the option text never runs onto the next line.
static AR_OPTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*•][ \t]*)?(?:أ|ب|ج|د)\.[ \t]*(.+)").expect("arabic option regex"));
// The answer letter must stand alone, not open a word.
static AR_ANSWER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"الإجابة:\s*([أبجد])(?:[\s.)،]|$)").expect("arabic answer regex"));

static FR_QUESTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)Question:\s*(.+)").expect("french question regex"));
// Option markers stay case-sensitive.
static FR_OPTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*•][ \t]*)?(?:A|B|C|D)\.[ \t]*(.+)").expect("french option regex"));
static FR_ANSWER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)Réponse:\s*([A-D])(?:[\s.)]|$)").expect("french answer regex"));

struct Layout {
  question: &'static LazyLock<Regex>,
  option: &'static LazyLock<Regex>,
  answer: &'static LazyLock<Regex>,
}

static ARABIC: Layout = Layout { question: &AR_QUESTION, option: &AR_OPTION, answer: &AR_ANSWER };
static FRENCH: Layout = Layout { question: &FR_QUESTION, option: &FR_OPTION, answer: &FR_ANSWER };

/// `**text**` -> `text`, so emphasis never leaks into stored fields.
pub fn strip_bold(text: &str) -> String {
  BOLD.replace_all(text, "${1}").into_owned()
}

pub fn parse(raw: &str) -> Result<ParsedQcm, ParseError> {
  let text = strip_bold(raw);
  extract(&text, &ARABIC)
    .or_else(|| extract(&text, &FRENCH).map(normalise_latin_answer))
    .ok_or_else(|| ParseError { raw: raw.to_string() })
}

/// Accepts only when question, at least four options and answer are all present.
/// Extra options past the fourth are dropped in document order.
fn extract(text: &str, layout: &Layout) -> Option<ParsedQcm> {
  let question = layout.question.captures(text)?.get(1)?.as_str().trim().to_string();

  let options: Vec<String> = layout
    .option
    .captures_iter(text)
    .filter_map(|c| c.get(1))
    .map(|m| m.as_str().trim().to_string())
    .take(4)
    .collect();
  let choices = <[String; 4]>::try_from(options).ok()?;

  let answer = layout.answer.captures(text)?.get(1)?.as_str().trim().to_string();

  Some(ParsedQcm { question, choices, answer })
}

fn normalise_latin_answer(mut qcm: ParsedQcm) -> ParsedQcm {
  qcm.answer = qcm.answer.to_uppercase();
  qcm
}
