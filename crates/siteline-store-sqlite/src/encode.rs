//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Answers, scores and
//! reports are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings. Enums are stored as their lowercase discriminants;
//! note that `tier1` < `tier2` < `tier3` sorts lexicographically in rank
//! order, which is what the SQL monotonic-upgrade guard relies on.

use chrono::{DateTime, Utc};
use siteline_core::{
  assessment::{Assessment, AssessmentStatus, Tier},
  payment::{PaymentRecord, PaymentStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── AssessmentStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: AssessmentStatus) -> &'static str {
  match s {
    AssessmentStatus::Processing => "processing",
    AssessmentStatus::Completed => "completed",
    AssessmentStatus::Error => "error",
  }
}

pub fn decode_status(s: &str) -> Result<AssessmentStatus> {
  match s {
    "processing" => Ok(AssessmentStatus::Processing),
    "completed" => Ok(AssessmentStatus::Completed),
    "error" => Ok(AssessmentStatus::Error),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Tier ────────────────────────────────────────────────────────────────────

pub fn encode_tier(t: Tier) -> &'static str {
  match t {
    Tier::Tier1 => "tier1",
    Tier::Tier2 => "tier2",
    Tier::Tier3 => "tier3",
  }
}

pub fn decode_tier(s: &str) -> Result<Tier> {
  match s {
    "tier1" => Ok(Tier::Tier1),
    "tier2" => Ok(Tier::Tier2),
    "tier3" => Ok(Tier::Tier3),
    other => Err(Error::Decode(format!("unknown tier: {other:?}"))),
  }
}

// ─── PaymentStatus ───────────────────────────────────────────────────────────

pub fn encode_payment_status(s: PaymentStatus) -> &'static str {
  match s {
    PaymentStatus::Completed => "completed",
  }
}

pub fn decode_payment_status(s: &str) -> Result<PaymentStatus> {
  match s {
    "completed" => Ok(PaymentStatus::Completed),
    other => Err(Error::Decode(format!("unknown payment status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `assessments` row.
pub struct RawAssessment {
  pub assessment_id: String,
  pub answers_json:  String,
  pub score_json:    String,
  pub status:        String,
  pub tier:          String,
  pub report_json:   Option<String>,
  pub error_detail:  Option<String>,
  pub created_at:    String,
  pub processed_at:  Option<String>,
  pub paid_at:       Option<String>,
  pub user_id:       Option<String>,
}

impl RawAssessment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assessment_id: row.get(0)?,
      answers_json:  row.get(1)?,
      score_json:    row.get(2)?,
      status:        row.get(3)?,
      tier:          row.get(4)?,
      report_json:   row.get(5)?,
      error_detail:  row.get(6)?,
      created_at:    row.get(7)?,
      processed_at:  row.get(8)?,
      paid_at:       row.get(9)?,
      user_id:       row.get(10)?,
    })
  }

  pub fn into_assessment(self) -> Result<Assessment> {
    Ok(Assessment {
      assessment_id: decode_uuid(&self.assessment_id)?,
      answers:       serde_json::from_str(&self.answers_json)?,
      score:         serde_json::from_str(&self.score_json)?,
      status:        decode_status(&self.status)?,
      tier:          decode_tier(&self.tier)?,
      report:        self
        .report_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      error_detail:  self.error_detail,
      created_at:    decode_dt(&self.created_at)?,
      processed_at:  self.processed_at.as_deref().map(decode_dt).transpose()?,
      paid_at:       self.paid_at.as_deref().map(decode_dt).transpose()?,
      user_id:       self.user_id,
    })
  }
}

/// Raw strings read directly from a `payments` row.
pub struct RawPayment {
  pub session_id:    String,
  pub assessment_id: String,
  pub amount_total:  i64,
  pub currency:      String,
  pub status:        String,
  pub created_at:    String,
}

impl RawPayment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:    row.get(0)?,
      assessment_id: row.get(1)?,
      amount_total:  row.get(2)?,
      currency:      row.get(3)?,
      status:        row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<PaymentRecord> {
    Ok(PaymentRecord {
      session_id:    self.session_id,
      assessment_id: decode_uuid(&self.assessment_id)?,
      amount_total:  self.amount_total,
      currency:      self.currency,
      status:        decode_payment_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
