//! Process configuration (environment) and prompt templates (optional TOML).
//!
//! Env variables:
//!   GEMINI_API_KEY       : required, startup fails without it
//!   GEMINI_MODEL         : default "gemini-1.5-flash-latest"
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com/v1beta"
//!   MODEL_TIMEOUT_SECS   : upper bound for one model call, default 30
//!   DATABASE_PATH        : SQLite file, default "data/qcm.db"
//!   PORT                 : u16, default 5000
//!   PROMPTS_CONFIG_PATH  : TOML file overriding `Prompts`

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_PATH: &str = "data/qcm.db";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("GEMINI_API_KEY not found in environment")]
  MissingApiKey,
  #[error("invalid value for {name}: {value}")]
  Invalid { name: &'static str, value: String },
}

/// Everything read from the environment once at startup. Read-only afterwards.
#[derive(Clone)]
pub struct AppConfig {
  pub api_key: String,
  pub model: String,
  pub base_url: String,
  pub model_timeout: Duration,
  pub database_path: PathBuf,
  pub port: u16,
  pub prompts: Prompts,
}

impl std::fmt::Debug for AppConfig {
  // Keeps the API key out of logs.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("model", &self.model)
      .field("base_url", &self.base_url)
      .field("model_timeout", &self.model_timeout)
      .field("database_path", &self.database_path)
      .field("port", &self.port)
      .finish_non_exhaustive()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build from any variable source; `from_env` plugs in the process environment.
  pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let api_key = get("GEMINI_API_KEY")
      .filter(|k| !k.trim().is_empty())
      .ok_or(ConfigError::MissingApiKey)?;
    let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
    let base_url = get("GEMINI_BASE_URL")
      .unwrap_or_else(|| DEFAULT_BASE_URL.into())
      .trim_end_matches('/')
      .to_string();

    let timeout_secs = match get("MODEL_TIMEOUT_SECS") {
      Some(v) => v
        .parse::<u64>()
        .ok()
        .filter(|s| *s > 0)
        .ok_or(ConfigError::Invalid { name: "MODEL_TIMEOUT_SECS", value: v })?,
      None => DEFAULT_TIMEOUT_SECS,
    };
    let port = match get("PORT") {
      Some(v) => v
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?,
      None => DEFAULT_PORT,
    };
    let database_path = get("DATABASE_PATH")
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    let prompts = get("PROMPTS_CONFIG_PATH")
      .and_then(|path| load_prompts(&path))
      .unwrap_or_default();

    Ok(Self {
      api_key,
      model,
      base_url,
      model_timeout: Duration::from_secs(timeout_secs),
      database_path,
      port,
      prompts,
    })
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
struct PromptsFile {
  #[serde(default)]
  prompts: Prompts,
}

/// Instruction templates sent to the model. Placeholders: `{text}`, `{level}`, `{difficulty}`.
/// Both defaults spell out the exact line markers the response parser looks for.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub arabic_template: String,
  pub french_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      arabic_template: "📘 النص التالي:\n\n{text}\n\n✍️ المستوى: {level} - الصعوبة: {difficulty}\n\n🎯 أنشئ سؤال اختيار من متعدد (QCM) باللغة العربية مكوَّن من أربعة اختيارات مع إجابة واحدة صحيحة.\n\n✅ استخدم هذا التنسيق فقط:\n\nالسؤال: ...\nأ. ...\nب. ...\nج. ...\nد. ...\nالإجابة: ...\n".into(),
      french_template: "📘 Texte suivant :\n\n{text}\n\n✍️ Niveau : {level} - Difficulté : {difficulty}\n\n🎯 Générez une question à choix multiples (QCM) en français avec quatre options et une seule bonne réponse.\n\n✅ Utilisez exactement ce format :\n\nQuestion: ...\nA. ...\nB. ...\nC. ...\nD. ...\nRéponse: ...\n".into(),
    }
  }
}

/// Load prompt overrides from a TOML file. On any IO/parse error, logs and returns None.
fn load_prompts(path: &str) -> Option<Prompts> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<PromptsFile>(&s) {
      Ok(file) => {
        info!(target: "qcm_backend", %path, "Loaded prompt templates (TOML)");
        Some(file.prompts)
      }
      Err(e) => {
        error!(target: "qcm_backend", %path, error = %e, "Failed to parse TOML prompts; using defaults");
        None
      }
    },
    Err(e) => {
      error!(target: "qcm_backend", %path, error = %e, "Failed to read TOML prompts file; using defaults");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
      vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn missing_api_key_is_fatal() {
    let err = AppConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiKey));
    let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiKey));
  }

  #[test]
  fn defaults_apply() {
    let cfg = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.model_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.database_path, PathBuf::from(DEFAULT_DB_PATH));
    assert!(cfg.prompts.arabic_template.contains("{text}"));
  }

  #[test]
  fn debug_output_hides_api_key() {
    let cfg = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "secret-key")])).unwrap();
    assert!(!format!("{cfg:?}").contains("secret-key"));
  }

  #[test]
  fn rejects_bad_numbers() {
    let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k"), ("PORT", "http")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    let err =
      AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k"), ("MODEL_TIMEOUT_SECS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "MODEL_TIMEOUT_SECS", .. }));
  }

  #[test]
  fn prompts_toml_overrides_one_template() {
    let file: PromptsFile = toml::from_str(
      "[prompts]\nfrench_template = \"Texte: {text}\"\n",
    )
    .unwrap();
    assert_eq!(file.prompts.french_template, "Texte: {text}");
    assert_eq!(file.prompts.arabic_template, Prompts::default().arabic_template);
  }
}
