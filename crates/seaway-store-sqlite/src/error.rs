//! Error type for `seaway-store-sqlite`.

use seaway_core::{Classify, FaultKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] seaway_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Classify for Error {
  fn fault_kind(&self) -> FaultKind {
    match self {
      Error::Core(e) => e.fault_kind(),
      _ => FaultKind::Internal,
    }
  }
}

/// True when the underlying failure is a SQLite constraint violation whose
/// message names `needle` (a column or index). Used to translate unique-index
/// hits into domain errors.
pub(crate) fn constraint_on(err: &tokio_rusqlite::Error, needle: &str) -> bool {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg)) = err {
    f.code == rusqlite::ErrorCode::ConstraintViolation
      && msg.as_deref().is_some_and(|m| m.contains(needle))
  } else {
    false
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
