//! Generative-model client.
//!
//! `ModelClient` is the seam the request flow talks to; `GeminiClient` is the production
//! implementation over the `generateContent` REST call. One attempt per request, bounded by
//! the configured timeout. Calls log model name, latency and token usage (never prompt or key).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ModelError {
  #[error("model request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("model HTTP {status}: {message}")]
  Api { status: u16, message: String },
  #[error("model returned no text{}", finish_suffix(.reason))]
  Empty { reason: Option<String> },
}

fn finish_suffix(reason: &Option<String>) -> String {
  reason.as_deref().map(|r| format!(" (finish reason: {r})")).unwrap_or_default()
}

#[async_trait]
pub trait ModelClient: Send + Sync {
  /// Send one prompt, get the model's raw text back.
  async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Clone)]
pub struct GeminiClient {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
}

impl GeminiClient {
  pub fn new(cfg: &AppConfig) -> Result<Self, ModelError> {
    Self::with_timeout(&cfg.api_key, &cfg.base_url, &cfg.model, cfg.model_timeout)
  }

  pub fn with_timeout(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self, ModelError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      api_key: api_key.to_string(),
      base_url: base_url.trim_end_matches('/').to_string(),
      model: model.trim_start_matches("models/").to_string(),
    })
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.base_url, self.model)
  }
}

#[async_trait]
impl ModelClient for GeminiClient {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
    };

    let start = Instant::now();
    let res = self
      .client
      .post(self.endpoint())
      .header(USER_AGENT, "qcm-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| {
        error!(elapsed = ?start.elapsed(), error = %e, "Model request failed");
        ModelError::from(e)
      })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), %status, "Model returned error status");
      return Err(ModelError::Api { status: status.as_u16(), message });
    }

    let body: GenerateContentResponse = res.json().await?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, completion_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Model usage");
    }
    let elapsed = start.elapsed();

    let text = candidate_text(&body);
    if text.trim().is_empty() {
      let reason = body.candidates.first().and_then(|c| c.finish_reason.clone());
      error!(?elapsed, ?reason, "Model reply carried no text");
      return Err(ModelError::Empty { reason });
    }

    info!(?elapsed, reply_len = text.len(), "Model response received");
    Ok(text)
  }
}

/// Text parts of the first candidate, concatenated.
fn candidate_text(body: &GenerateContentResponse) -> String {
  body
    .candidates
    .first()
    .and_then(|c| c.content.as_ref())
    .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
    .unwrap_or_default()
}

/// Try to extract a clean error message from the provider's error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
}
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  #[serde(default)] content: Option<CandidateContent>,
  #[serde(default)] finish_reason: Option<String>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)] parts: Vec<CandidatePart>,
}
#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)] text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}
