//! Application state shared by all handlers: model client, store and prompt templates.
//!
//! Everything here is read-only after startup; each request gets its own storage
//! connection inside the store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{AppConfig, Prompts};
use crate::gemini::{GeminiClient, ModelClient, ModelError};
use crate::store::{QcmStore, SqliteStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot build model client: {0}")]
    Model(#[from] ModelError),
    #[error("cannot open storage: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub store: Arc<dyn QcmStore>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build production state: Gemini client and SQLite store from the config.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(cfg: &AppConfig) -> Result<Self, StartupError> {
        let gemini = GeminiClient::new(cfg)?;
        info!(target: "qcm_backend", base_url = %gemini.base_url, model = %gemini.model, timeout = ?cfg.model_timeout, "Model client ready");
        let store = SqliteStore::open(&cfg.database_path)?;
        Ok(Self::with_parts(Arc::new(gemini), Arc::new(store), cfg.prompts.clone()))
    }

    pub fn with_parts(model: Arc<dyn ModelClient>, store: Arc<dyn QcmStore>, prompts: Prompts) -> Self {
        Self { model, store, prompts }
    }
}
