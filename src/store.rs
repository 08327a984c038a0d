//! Persistence of generated questions.
//!
//! One row per successful generation, insert-only. `SqliteStore` opens a connection per
//! write on the blocking pool and drops it before returning, whatever the outcome.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::McqRecord;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),
  #[error("database directory error: {0}")]
  Io(#[from] std::io::Error),
  #[error("database task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait QcmStore: Send + Sync {
  /// Insert one generated question; returns the new row id.
  async fn save(&self, record: &McqRecord) -> Result<i64, StoreError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS qcm (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    id_texte    INTEGER,
    question    TEXT NOT NULL,
    choix       TEXT NOT NULL,
    reponse     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
";

#[derive(Clone, Debug)]
pub struct SqliteStore {
  path: PathBuf,
}

impl SqliteStore {
  /// Create the parent directory and the `qcm` table if needed.
  pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent)?;
      }
    }
    let conn = Connection::open(&path)?;
    conn.execute_batch(SCHEMA)?;
    info!(target: "qcm_backend", path = %path.display(), "SQLite store ready");
    Ok(Self { path })
  }

  fn insert(path: &Path, record: &McqRecord) -> Result<i64, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute(
      "INSERT INTO qcm (id_texte, question, choix, reponse, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        record.source_text_id,
        record.question,
        record.combined_choices,
        record.answer,
        Utc::now().to_rfc3339(),
      ],
    )?;
    Ok(conn.last_insert_rowid())
  }
}

#[async_trait]
impl QcmStore for SqliteStore {
  #[instrument(level = "info", skip(self, record), fields(source_text_id = ?record.source_text_id))]
  async fn save(&self, record: &McqRecord) -> Result<i64, StoreError> {
    let path = self.path.clone();
    let record = record.clone();
    let id = tokio::task::spawn_blocking(move || Self::insert(&path, &record)).await??;
    info!(row_id = id, "QCM row stored");
    Ok(id)
  }
}
