//! Server error type and HTTP mapping.
//!
//! Internal causes are logged server-side and never leak to clients; the
//! response body carries a generic message for anything unexpected.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("not found")]
  NotFound,

  #[error("invalid signature")]
  InvalidSignature,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn internal<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
      Error::InvalidSignature => {
        // Security-relevant: a delivery failed its authenticity check.
        tracing::warn!("webhook signature verification failed");
        (StatusCode::BAD_REQUEST, "invalid signature".to_string())
      }
      Error::Internal(e) => {
        tracing::error!(error = %e, "internal error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_string(),
        )
      }
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<siteline_engine::Error> for Error {
  fn from(e: siteline_engine::Error) -> Self {
    use siteline_engine::Error as Engine;
    match e {
      Engine::InvalidInput(m) => Error::InvalidInput(m),
      Engine::InvalidSignature => Error::InvalidSignature,
      // Rejected, fail safe: a payment for an assessment we have never
      // seen is a client-side integration fault.
      Engine::UnknownAssessment(id) => {
        Error::InvalidInput(format!("unknown assessment: {id}"))
      }
      Engine::Payload(e) => Error::InvalidInput(format!("malformed payload: {e}")),
      Engine::Store(e) => Error::Internal(e),
    }
  }
}
