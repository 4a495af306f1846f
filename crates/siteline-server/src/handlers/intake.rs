//! `POST /assessments` — questionnaire intake.
//!
//! Persists the submission, then dispatches enrichment as a detached task.
//! The response never waits for enrichment.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use siteline_core::{score::Answers, store::AssessmentStore};
use siteline_engine::{enrich, intake};

use crate::{AppState, error::Error};

/// JSON body accepted by `POST /assessments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeBody {
  pub answers:      Answers,
  /// Client-side submission clock; recorded for diagnostics only — the
  /// stored creation timestamp is always server-assigned.
  #[serde(default)]
  pub submitted_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub user_id:      Option<String>,
}

/// `POST /assessments` — 201 + `{assessmentId, token, score}`.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<IntakeBody>,
) -> Result<impl IntoResponse, Error>
where
  S: AssessmentStore + Clone + 'static,
{
  let receipt = intake::submit(
    state.store.as_ref(),
    state.crm.as_ref(),
    body.answers.clone(),
    body.submitted_at,
    body.user_id,
  )
  .await?;

  enrich::spawn(
    state.store.clone(),
    state.generator.clone(),
    state.notifier.clone(),
    state.enrichment_timeout(),
    receipt.assessment_id,
    body.answers,
  );

  Ok((StatusCode::CREATED, Json(receipt)))
}
