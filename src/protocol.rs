//! Public HTTP request/response structs (serde ready).

use serde::{Deserialize, Serialize};

use crate::domain::McqRecord;

fn default_level() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    /// Absent and `null` both read as no text.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, rename = "sourceTextId", alias = "idTexte")]
    pub source_text_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeneratedOut {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: String,
}

impl From<&McqRecord> for GeneratedOut {
    fn from(r: &McqRecord) -> Self {
        Self {
            question: r.question.clone(),
            choices: r.choices.to_vec(),
            answer: r.answer.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct GenerateOut {
    pub message: String,
    #[serde(flatten)]
    pub qcm: GeneratedOut,
}

#[derive(Serialize)]
pub struct RawOut {
    pub qcm: String,
}

/// Every failure body. `generated` is only set when storage failed after a successful parse.
#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
    #[serde(flatten)]
    pub generated: Option<GeneratedOut>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
