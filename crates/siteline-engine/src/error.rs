//! Error types for `siteline-engine`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed submission — rejected before any state change.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A payment delivery failed its authenticity check. No state action is
  /// ever taken for these.
  #[error("invalid signature")]
  InvalidSignature,

  /// A verified payment event referenced an assessment this store has
  /// never seen — rejected, fail safe.
  #[error("unknown assessment: {0}")]
  UnknownAssessment(Uuid),

  #[error("malformed event payload: {0}")]
  Payload(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
