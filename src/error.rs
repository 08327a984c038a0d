//! Request-level error taxonomy and its HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::gemini::ModelError;
use crate::parser::ParseError;
use crate::protocol::{ErrorOut, GeneratedOut};
use crate::store::StoreError;
use crate::util::trunc_for_log;

pub const NO_INPUT_TEXT: &str = "No input text provided.";

#[derive(Debug, Error)]
pub enum AppError {
  /// Caller's fault: missing text or unreadable body.
  #[error("{0}")]
  Validation(String),
  #[error(transparent)]
  Upstream(#[from] ModelError),
  #[error(transparent)]
  Parse(#[from] ParseError),
  /// Storage failed after generation; the generated content rides along in the response.
  #[error("{source}")]
  Persistence {
    source: StoreError,
    generated: GeneratedOut,
  },
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
      AppError::Parse(_) | AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    match &self {
      AppError::Validation(msg) => warn!(target: "qcm", %msg, "Rejected request"),
      AppError::Upstream(e) => error!(target: "qcm", error = %e, "Model call failed"),
      AppError::Parse(e) => warn!(target: "qcm", raw = %trunc_for_log(&e.raw, 2000), "Model reply did not match either QCM layout"),
      AppError::Persistence { source, .. } => error!(target: "qcm", error = %source, "Failed to store generated QCM"),
    }
    let error = self.to_string();
    let generated = match self {
      AppError::Persistence { generated, .. } => Some(generated),
      _ => None,
    };
    (status, Json(ErrorOut { error, generated })).into_response()
  }
}
