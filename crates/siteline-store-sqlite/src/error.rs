//! Error type for `siteline-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),

  /// Attempted a status transition or tier upgrade on a record that does
  /// not exist.
  #[error("assessment not found: {0}")]
  AssessmentNotFound(uuid::Uuid),

  /// Token generation kept colliding with stored tokens. With a 36-symbol
  /// alphabet at length 12 this indicates a broken RNG, not bad luck.
  #[error("could not generate a unique public token")]
  TokenSpaceExhausted,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
