//! Test doubles for the model and storage seams.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Prompts;
use crate::domain::McqRecord;
use crate::gemini::{ModelClient, ModelError};
use crate::state::AppState;
use crate::store::{QcmStore, StoreError};

pub const ARABIC_REPLY: &str = "**السؤال:** ما هي عاصمة مصر؟\nأ. القاهرة\nب. الإسكندرية\nج. أسوان\nد. الأقصر\n**الإجابة:** أ";
pub const FRENCH_REPLY: &str = "Question: Quelle est la capitale de la France ?\nA. Lyon\nB. Paris\nC. Marseille\nD. Lille\nRéponse: B";

/// Replies with a fixed text (or an API error) and records every prompt.
pub struct ScriptedModel {
  reply: Result<String, (u16, String)>,
  pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
  pub fn replying(text: &str) -> Arc<Self> {
    Arc::new(Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) })
  }

  pub fn failing(status: u16, message: &str) -> Arc<Self> {
    Arc::new(Self { reply: Err((status, message.to_string())), prompts: Mutex::new(Vec::new()) })
  }

  pub fn calls(&self) -> Vec<String> {
    self.prompts.lock().unwrap().clone()
  }
}

#[async_trait]
impl ModelClient for ScriptedModel {
  async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
    self.prompts.lock().unwrap().push(prompt.to_string());
    match &self.reply {
      Ok(text) => Ok(text.clone()),
      Err((status, message)) => Err(ModelError::Api { status: *status, message: message.clone() }),
    }
  }
}

/// Keeps saved records in memory; can be told to fail every write.
#[derive(Default)]
pub struct RecordingStore {
  fail: bool,
  pub saved: Mutex<Vec<McqRecord>>,
}

impl RecordingStore {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn failing() -> Arc<Self> {
    Arc::new(Self { fail: true, saved: Mutex::new(Vec::new()) })
  }

  pub fn records(&self) -> Vec<McqRecord> {
    self.saved.lock().unwrap().clone()
  }
}

#[async_trait]
impl QcmStore for RecordingStore {
  async fn save(&self, record: &McqRecord) -> Result<i64, StoreError> {
    if self.fail {
      return Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
    }
    let mut saved = self.saved.lock().unwrap();
    saved.push(record.clone());
    Ok(saved.len() as i64)
  }
}

pub fn state_with(model: Arc<ScriptedModel>, store: Arc<RecordingStore>) -> AppState {
  AppState::with_parts(model, store, Prompts::default())
}
