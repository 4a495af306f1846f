//! Report content produced by the enrichment step.
//!
//! Set exactly once, when an assessment transitions to `completed`. The
//! field names follow the JSON shape clients already consume.

use serde::{Deserialize, Serialize};

/// The full report body stored on a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContent {
  pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
  pub key_findings:     Vec<String>,
  pub project_snapshot: ProjectSnapshot,
}

/// Headline figures, pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
  pub estimated_cost:       String,
  pub estimated_timeline:   String,
  pub permit_difficulty:    String,
  pub return_on_investment: String,
}
