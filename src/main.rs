//! QCM generation backend
//!
//! - Axum HTTP API: `POST /generate_qcm`, `POST /generate_qcm_raw`, `GET /health`
//! - Gemini `generateContent` for question generation (Arabic or French)
//! - SQLite storage of generated questions
//!
//! Configuration comes from the environment (a `.env` file is read first when present),
//! see `config.rs` for the variables. Logging:
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT   : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod language;
mod prompt;
mod parser;
mod formatter;
mod gemini;
mod store;
mod error;
mod protocol;
mod state;
mod logic;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let dotenv = dotenvy::dotenv();
  telemetry::init_tracing();
  if let Err(e) = &dotenv {
    if !e.not_found() {
      warn!(target: "qcm_backend", error = %e, "Ignoring unreadable .env file");
    }
  }

  let cfg = AppConfig::from_env().map_err(|e| {
    error!(target: "qcm_backend", error = %e, "Invalid configuration");
    e
  })?;
  info!(target: "qcm_backend", config = ?cfg, "Configuration loaded");

  let state = Arc::new(AppState::from_config(&cfg)?);
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "qcm_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "qcm_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "qcm_backend", error = %e, "Failed to listen for Ctrl-C; running until killed");
    std::future::pending::<()>().await;
  }
}
