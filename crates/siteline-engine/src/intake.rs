//! Intake — questionnaire submission to stored assessment.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use siteline_core::{
  assessment::NewAssessment,
  score::{self, Answers, ScoreRecord},
  store::AssessmentStore,
};

use crate::{
  error::{Error, Result},
  notify::CrmSync,
};

/// What the submitting client gets back. Enrichment continues in the
/// background; the receipt never waits for it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReceipt {
  pub assessment_id: Uuid,
  pub token:         String,
  pub score:         ScoreRecord,
}

/// Validate, score and persist a submission.
///
/// The CRM sync is fire-and-forget: its failure is logged and swallowed,
/// never the submitter's problem. Enrichment dispatch is the caller's next
/// step (see [`crate::enrich::spawn`]) so each transport decides how to run
/// the worker.
pub async fn submit<S, C>(
  store: &S,
  crm: &C,
  answers: Answers,
  submitted_at: Option<DateTime<Utc>>,
  user_id: Option<String>,
) -> Result<IntakeReceipt>
where
  S: AssessmentStore,
  C: CrmSync,
{
  if answers.is_empty() {
    return Err(Error::InvalidInput("answers must not be empty".to_string()));
  }

  let record = score::score(&answers);

  let mut new = NewAssessment::new(answers, record);
  new.user_id = user_id;

  let (assessment, token) = store.create(new).await.map_err(Error::store)?;

  tracing::info!(
    assessment_id = %assessment.assessment_id,
    total = record.total,
    "assessment created"
  );
  if let Some(at) = submitted_at {
    tracing::debug!(
      assessment_id = %assessment.assessment_id,
      client_submitted_at = %at,
      "client-reported submission time"
    );
  }

  if let Err(e) = crm.sync_contact(&assessment.answers).await {
    tracing::warn!(
      assessment_id = %assessment.assessment_id,
      error = %e,
      "CRM contact sync failed"
    );
  }

  Ok(IntakeReceipt {
    assessment_id: assessment.assessment_id,
    token:         token.token,
    score:         record,
  })
}
