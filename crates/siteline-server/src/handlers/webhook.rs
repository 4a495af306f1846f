//! `POST /webhooks/payment` — signed payment-event intake.

use axum::{Json, extract::State, http::HeaderMap};
use bytes::Bytes;
use serde_json::{Value, json};
use siteline_core::store::AssessmentStore;
use siteline_engine::reconcile;

use crate::{AppState, error::Error};

/// Header carrying the provider signature (`t=<unix>,v1=<hex>`).
pub const SIGNATURE_HEADER: &str = "siteline-signature";

/// `POST /webhooks/payment` — 200 `{"received":true}` for processed and
/// ignored deliveries alike; 400 when the signature or payload is bad.
///
/// The signature covers the exact bytes on the wire, so the handler takes
/// the raw body and leaves JSON decoding to the reconciler.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Value>, Error>
where
  S: AssessmentStore + Clone,
{
  let signature = headers
    .get(SIGNATURE_HEADER)
    .and_then(|v| v.to_str().ok());

  let outcome = reconcile::reconcile(
    state.store.as_ref(),
    state.schedule.as_ref(),
    state.config.webhook_secret.as_bytes(),
    signature,
    &body,
  )
  .await?;

  tracing::debug!(?outcome, "payment webhook acknowledged");
  Ok(Json(json!({ "received": true })))
}
