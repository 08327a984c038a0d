//! Request flow for one generation call:
//! validate, detect language, build prompt, call the model, parse, format, persist.
//!
//! Single attempt at every step; the first failure ends the call with a typed `AppError`.

use tracing::{debug, info, instrument};

use crate::domain::{GenerationRequest, Language, McqRecord};
use crate::error::{AppError, NO_INPUT_TEXT};
use crate::protocol::GeneratedOut;
use crate::state::AppState;
use crate::util::trunc_for_log;
use crate::{formatter, language, parser, prompt};

struct Prepared {
  lang: Language,
  prompt: String,
}

fn prepare(state: &AppState, req: &GenerationRequest) -> Result<Prepared, AppError> {
  if req.text.trim().is_empty() {
    return Err(AppError::Validation(NO_INPUT_TEXT.into()));
  }
  let lang = language::detect(&req.text);
  let difficulty = req
    .difficulty
    .as_deref()
    .filter(|d| !d.trim().is_empty())
    .unwrap_or_else(|| lang.default_difficulty());
  let prompt = prompt::build(&state.prompts, &req.text, req.level, difficulty, lang);
  debug!(target: "qcm", lang = lang.code(), %difficulty, level = req.level, prompt_len = prompt.len(), "Prompt built");
  Ok(Prepared { lang, prompt })
}

async fn ask_model(state: &AppState, prompt: &str) -> Result<String, AppError> {
  let raw = state.model.generate(prompt).await?;
  debug!(target: "qcm", raw = %trunc_for_log(&raw, 1000), "Raw model output");
  Ok(raw)
}

/// Full flow; the stored row and the returned record always agree.
#[instrument(level = "info", skip(state, req), fields(text_len = req.text.len(), level = req.level, source_text_id = ?req.source_text_id))]
pub async fn generate_qcm(state: &AppState, req: GenerationRequest) -> Result<McqRecord, AppError> {
  let Prepared { lang, prompt } = prepare(state, &req)?;
  let raw = ask_model(state, &prompt).await?;

  let parsed = parser::parse(&raw)?;
  let combined_choices = formatter::combine_choices(&parsed.choices, &parsed.answer);
  let record = McqRecord {
    question: parsed.question,
    choices: parsed.choices,
    answer: parsed.answer,
    combined_choices,
    source_text_id: req.source_text_id,
  };

  let row_id = state.store.save(&record).await.map_err(|source| AppError::Persistence {
    source,
    generated: GeneratedOut::from(&record),
  })?;

  info!(target: "qcm", lang = lang.code(), row_id, answer = %record.answer, "QCM generated and stored");
  Ok(record)
}

/// Parse-free variant: the model's reply is handed back untouched and nothing is stored.
#[instrument(level = "info", skip(state, req), fields(text_len = req.text.len(), level = req.level))]
pub async fn generate_raw(state: &AppState, req: GenerationRequest) -> Result<String, AppError> {
  let Prepared { lang, prompt } = prepare(state, &req)?;
  let raw = ask_model(state, &prompt).await?;
  info!(target: "qcm", lang = lang.code(), reply_len = raw.len(), "Raw QCM generated");
  Ok(raw)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gemini::ModelError;
  use crate::testing::*;

  fn request(text: &str, difficulty: Option<&str>) -> GenerationRequest {
    GenerationRequest {
      text: text.into(),
      level: 2,
      difficulty: difficulty.map(String::from),
      source_text_id: Some(42),
    }
  }

  #[tokio::test]
  async fn arabic_text_flows_through_to_storage() {
    let model = ScriptedModel::replying(ARABIC_REPLY);
    let store = RecordingStore::new();
    let state = state_with(model.clone(), store.clone());

    let rec = generate_qcm(&state, request("القاهرة هي عاصمة مصر", Some("متوسط"))).await.expect("generated");
    assert_eq!(rec.question, "ما هي عاصمة مصر؟");
    assert_eq!(rec.answer, "أ");
    assert_eq!(rec.combined_choices, "أ. القاهرة\nب. الإسكندرية\nج. أسوان\nد. الأقصر");

    let prompts = model.calls();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("الإجابة:"));
    assert!(prompts[0].contains("الصعوبة: متوسط"));

    let saved = store.records();
    assert_eq!(saved, vec![rec]);
    assert_eq!(saved[0].source_text_id, Some(42));
  }

  #[tokio::test]
  async fn missing_difficulty_uses_language_default() {
    let model = ScriptedModel::replying(FRENCH_REPLY);
    let state = state_with(model.clone(), RecordingStore::new());
    generate_qcm(&state, request("Paris est la capitale.", None)).await.expect("generated");
    assert!(model.calls()[0].contains("Difficulté : facile"));

    let model = ScriptedModel::replying(ARABIC_REPLY);
    let state = state_with(model.clone(), RecordingStore::new());
    generate_qcm(&state, request("نص عربي", Some(" "))).await.expect("generated");
    assert!(model.calls()[0].contains("الصعوبة: سهل"));
  }

  #[tokio::test]
  async fn blank_text_never_reaches_model_or_store() {
    let model = ScriptedModel::replying(ARABIC_REPLY);
    let store = RecordingStore::new();
    let state = state_with(model.clone(), store.clone());

    let err = generate_qcm(&state, request("   ", None)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == NO_INPUT_TEXT));
    assert!(model.calls().is_empty());
    assert!(store.records().is_empty());
  }

  #[tokio::test]
  async fn unstructured_reply_is_not_stored() {
    let store = RecordingStore::new();
    let state = state_with(ScriptedModel::replying("Désolé, je ne peux pas."), store.clone());
    let err = generate_qcm(&state, request("Un texte", None)).await.unwrap_err();
    match err {
      AppError::Parse(e) => assert_eq!(e.raw, "Désolé, je ne peux pas."),
      other => panic!("expected parse error, got {other:?}"),
    }
    assert!(store.records().is_empty());
  }

  #[tokio::test]
  async fn model_failure_is_upstream_error() {
    let store = RecordingStore::new();
    let state = state_with(ScriptedModel::failing(503, "overloaded"), store.clone());
    let err = generate_qcm(&state, request("Un texte", None)).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(ModelError::Api { status: 503, .. })));
    assert!(store.records().is_empty());
  }

  #[tokio::test]
  async fn storage_failure_keeps_generated_content() {
    let state = state_with(ScriptedModel::replying(FRENCH_REPLY), RecordingStore::failing());
    let err = generate_qcm(&state, request("Un texte", None)).await.unwrap_err();
    match err {
      AppError::Persistence { generated, .. } => {
        assert_eq!(generated.answer, "B");
        assert_eq!(generated.choices, vec!["Lyon", "Paris", "Marseille", "Lille"]);
      }
      other => panic!("expected persistence error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn raw_variant_returns_reply_untouched() {
    let store = RecordingStore::new();
    let state = state_with(ScriptedModel::replying("pas de structure"), store.clone());
    let raw = generate_raw(&state, request("Un texte", None)).await.expect("raw");
    assert_eq!(raw, "pas de structure");
    assert!(store.records().is_empty());
  }
}
