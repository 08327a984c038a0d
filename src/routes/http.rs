//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; errors turn into JSON bodies through `AppError`.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::GenerationRequest;
use crate::error::AppError;
use crate::logic::{generate_qcm, generate_raw};
use crate::protocol::*;
use crate::state::AppState;

pub const STORED_MESSAGE: &str = "QCM generated and stored successfully.";

fn into_request(body: Result<Json<GenerateIn>, JsonRejection>) -> Result<GenerationRequest, AppError> {
  let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
  Ok(GenerationRequest {
    text: body.text.unwrap_or_default(),
    level: body.level,
    difficulty: body.difficulty,
    source_text_id: body.source_text_id,
  })
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip_all)]
pub async fn http_post_generate_qcm(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateIn>, JsonRejection>,
) -> Result<Json<GenerateOut>, AppError> {
  let req = into_request(body)?;
  let record = generate_qcm(&state, req).await?;
  info!(target: "qcm", answer = %record.answer, "HTTP generate_qcm served");
  Ok(Json(GenerateOut { message: STORED_MESSAGE.into(), qcm: GeneratedOut::from(&record) }))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_generate_qcm_raw(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateIn>, JsonRejection>,
) -> Result<Json<RawOut>, AppError> {
  let req = into_request(body)?;
  let qcm = generate_raw(&state, req).await?;
  Ok(Json(RawOut { qcm }))
}
