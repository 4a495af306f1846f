//! Outbound side effects — CRM contact sync and completion email.
//!
//! Both are explicitly non-critical: every caller logs a failure and moves
//! on. Real delivery lives behind these traits; the implementations in this
//! repository only log the payloads they would send.

use std::{convert::Infallible, fmt::Display, future::Future};

use siteline_core::{assessment::Assessment, score::Answers};

/// Pushes a lead contact into the CRM after intake. Fire-and-forget: a
/// failed sync never fails the submission.
pub trait CrmSync: Send + Sync {
  type Error: Display + Send;

  fn sync_contact(
    &self,
    answers: &Answers,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Notifies the submitter when their assessment completes. Best-effort: a
/// delivery failure never affects the stored state.
pub trait CompletionNotifier: Send + Sync {
  type Error: Display + Send;

  fn assessment_completed(
    &self,
    assessment: &Assessment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

// ─── Logging implementations ─────────────────────────────────────────────────

/// Logs the contact payload the CRM integration would create.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCrm;

impl CrmSync for LoggingCrm {
  type Error = Infallible;

  async fn sync_contact(&self, answers: &Answers) -> Result<(), Infallible> {
    tracing::info!(
      primary_use = answers.get("primary_use").unwrap_or("-"),
      lot_size = answers.get("lot_size").unwrap_or("-"),
      budget_range = answers.get("budget_range").unwrap_or("-"),
      timeline = answers.get("timeline").unwrap_or("-"),
      financing = answers.get("financing").unwrap_or("-"),
      "would create CRM lead contact"
    );
    Ok(())
  }
}

/// Logs the completion email it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl CompletionNotifier for LoggingNotifier {
  type Error = Infallible;

  async fn assessment_completed(
    &self,
    assessment: &Assessment,
  ) -> Result<(), Infallible> {
    tracing::info!(
      assessment_id = %assessment.assessment_id,
      score = assessment.score.total,
      "would send assessment-completed email"
    );
    Ok(())
  }
}
