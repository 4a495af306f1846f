//! Enrichment worker — drives every assessment out of `processing`.
//!
//! The worker is fire-and-forget from the submitter's perspective, but its
//! own contract is strict: every run terminates the assessment's status.
//! Generation is bounded by a timeout; success records `completed`, and any
//! failure — including the timeout — records `error` with a human-readable
//! cause. An assessment left in `processing` past the bound is a bug, not a
//! steady state.

use std::{future::Future, sync::Arc, time::Duration};

use uuid::Uuid;

use siteline_core::{
  report::{ProjectSnapshot, ReportContent, ReportSummary},
  score::Answers,
  store::AssessmentStore,
};

use crate::notify::CompletionNotifier;

// ─── Generator seam ──────────────────────────────────────────────────────────

/// The external processing step: answers in, report content out.
///
/// Implementations may call out to anything; the worker bounds them with a
/// timeout and holds no lock while awaiting them.
pub trait ReportGenerator: Send + Sync {
  type Error: std::fmt::Display + Send;

  fn generate(
    &self,
    answers: &Answers,
  ) -> impl Future<Output = Result<ReportContent, Self::Error>> + Send;
}

/// Deterministic report builder derived from the questionnaire alone.
/// Stands in for the model-backed generator until that integration lands.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeasibilityReportBuilder;

impl ReportGenerator for FeasibilityReportBuilder {
  type Error = std::convert::Infallible;

  async fn generate(&self, answers: &Answers) -> Result<ReportContent, Self::Error> {
    Ok(build_report(answers))
  }
}

fn build_report(answers: &Answers) -> ReportContent {
  let estimated_cost = match answers.get("budget_range") {
    Some("luxury") => "$250,000 - $350,000",
    Some("premium") => "$200,000 - $250,000",
    Some("standard") => "$150,000 - $200,000",
    _ => "$120,000 - $180,000",
  };

  let estimated_timeline = match answers.get("timeline") {
    Some("asap") => "5-7 months",
    _ => "6-8 months",
  };

  let return_on_investment = match answers.get("primary_use") {
    Some("rental") => "7-10 years",
    _ => "10-15 years",
  };

  let mut key_findings = vec![
    "Your property shows strong potential for accessory development".to_string(),
  ];
  if answers.get("lot_size") == Some("xlarge") || answers.get("lot_size") == Some("large") {
    key_findings.push("Lot size comfortably accommodates a detached unit".to_string());
  }
  key_findings.push("Your budget aligns with typical construction costs in this band".to_string());

  ReportContent {
    summary: ReportSummary {
      key_findings,
      project_snapshot: ProjectSnapshot {
        estimated_cost:       estimated_cost.to_string(),
        estimated_timeline:   estimated_timeline.to_string(),
        permit_difficulty:    "Moderate".to_string(),
        return_on_investment: return_on_investment.to_string(),
      },
    },
  }
}

// ─── Worker ──────────────────────────────────────────────────────────────────

/// Run one enrichment to termination.
///
/// Never returns an error to the dispatcher — every failure ends up in the
/// assessment's own error field, surfaced on subsequent reads.
pub async fn run<S, G, N>(
  store: &S,
  generator: &G,
  notifier: &N,
  timeout: Duration,
  assessment_id: Uuid,
  answers: Answers,
) where
  S: AssessmentStore,
  G: ReportGenerator,
  N: CompletionNotifier,
{
  match tokio::time::timeout(timeout, generator.generate(&answers)).await {
    Ok(Ok(report)) => match store.mark_completed(assessment_id, report).await {
      Ok(true) => {
        tracing::info!(%assessment_id, "assessment completed");
        notify_completed(store, notifier, assessment_id).await;
      }
      Ok(false) => {
        tracing::debug!(%assessment_id, "already terminal, completion dropped");
      }
      Err(e) => {
        tracing::error!(%assessment_id, error = %e, "failed to record completion");
      }
    },
    Ok(Err(e)) => {
      record_failure(store, assessment_id, format!("report generation failed: {e}")).await;
    }
    Err(_) => {
      record_failure(
        store,
        assessment_id,
        format!("report generation timed out after {}s", timeout.as_secs()),
      )
      .await;
    }
  }
}

/// Dispatch [`run`] as a detached task. Returns immediately; the task's
/// internal failures are never the dispatcher's failures.
pub fn spawn<S, G, N>(
  store: Arc<S>,
  generator: Arc<G>,
  notifier: Arc<N>,
  timeout: Duration,
  assessment_id: Uuid,
  answers: Answers,
) where
  S: AssessmentStore + 'static,
  G: ReportGenerator + 'static,
  N: CompletionNotifier + 'static,
{
  tokio::spawn(async move {
    run(
      store.as_ref(),
      generator.as_ref(),
      notifier.as_ref(),
      timeout,
      assessment_id,
      answers,
    )
    .await;
  });
}

async fn notify_completed<S, N>(store: &S, notifier: &N, assessment_id: Uuid)
where
  S: AssessmentStore,
  N: CompletionNotifier,
{
  // Best-effort: a missing read or a failed delivery is logged, nothing
  // more.
  match store.get(assessment_id).await {
    Ok(Some(assessment)) => {
      if let Err(e) = notifier.assessment_completed(&assessment).await {
        tracing::warn!(%assessment_id, error = %e, "completion notification failed");
      }
    }
    Ok(None) => {
      tracing::warn!(%assessment_id, "completed assessment vanished before notification");
    }
    Err(e) => {
      tracing::warn!(%assessment_id, error = %e, "could not load assessment for notification");
    }
  }
}

async fn record_failure<S>(store: &S, assessment_id: Uuid, detail: String)
where
  S: AssessmentStore,
{
  match store.mark_error(assessment_id, detail).await {
    Ok(true) => tracing::info!(%assessment_id, "assessment marked errored"),
    Ok(false) => {
      tracing::debug!(%assessment_id, "already terminal, error dropped");
    }
    Err(e) => {
      tracing::error!(%assessment_id, error = %e, "failed to record error status");
    }
  }
}
