//! Assessment — the central record of one questionnaire submission.
//!
//! An assessment is created in `processing` status and driven to a terminal
//! status by the enrichment worker. Its tier is an orthogonal axis raised by
//! payment reconciliation; the two never interact.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  report::ReportContent,
  score::{Answers, ScoreRecord},
  token,
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status. `Processing` is the only initial state; `Completed` and
/// `Error` are terminal — no transition ever leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
  Processing,
  Completed,
  Error,
}

impl AssessmentStatus {
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::Processing) }
}

// ─── Tier ────────────────────────────────────────────────────────────────────

/// Paid access level. The derived ordering is the upgrade order: a stored
/// tier only ever moves to a strictly greater one.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
  Tier1,
  Tier2,
  Tier3,
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// One submission and everything derived from it.
///
/// `answers` is an immutable input snapshot. `report` is present if and only
/// if `status` is `Completed`. `tier` never downgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
  pub assessment_id: Uuid,
  pub answers:       Answers,
  pub score:         ScoreRecord,
  pub status:        AssessmentStatus,
  pub tier:          Tier,
  pub report:        Option<ReportContent>,
  pub error_detail:  Option<String>,
  pub created_at:    DateTime<Utc>,
  pub processed_at:  Option<DateTime<Utc>>,
  pub paid_at:       Option<DateTime<Utc>>,
  /// Owning user, when the submission was authenticated. Anonymous
  /// submissions are allowed and common.
  pub user_id:       Option<String>,
}

impl Assessment {
  /// The anonymous read model served for a public token. Omits the raw
  /// answers and the owning user.
  pub fn public_view(&self) -> PublicAssessmentView {
    PublicAssessmentView {
      assessment_id: self.assessment_id,
      score:         self.score,
      status:        self.status,
      tier:          self.tier,
      report:        self.report.clone(),
      error_detail:  self.error_detail.clone(),
      created_at:    self.created_at,
      processed_at:  self.processed_at,
    }
  }
}

/// Input to [`crate::store::AssessmentStore::create`].
/// The identifier and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAssessment {
  pub answers:   Answers,
  pub score:     ScoreRecord,
  pub user_id:   Option<String>,
  /// Lifetime of the linked public token.
  pub token_ttl: Duration,
}

impl NewAssessment {
  /// Convenience constructor: anonymous submission, default token TTL.
  pub fn new(answers: Answers, score: ScoreRecord) -> Self {
    Self {
      answers,
      score,
      user_id: None,
      token_ttl: token::default_ttl(),
    }
  }
}

/// What a public token resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAssessmentView {
  pub assessment_id: Uuid,
  pub score:         ScoreRecord,
  pub status:        AssessmentStatus,
  pub tier:          Tier,
  pub report:        Option<ReportContent>,
  pub error_detail:  Option<String>,
  pub created_at:    DateTime<Utc>,
  pub processed_at:  Option<DateTime<Utc>>,
}
