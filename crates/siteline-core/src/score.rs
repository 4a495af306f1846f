//! The feasibility score — a pure function from questionnaire answers to a
//! scored record.
//!
//! Scoring is deterministic and total: unknown or missing answers never fail
//! a call, they fall back to each category's defined default contribution.
//! That makes the calculator trivially testable and safe to invoke any
//! number of times for the same submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Answers ─────────────────────────────────────────────────────────────────

/// The raw questionnaire submission: question key → chosen value.
///
/// Immutable once an assessment is created; the snapshot is stored verbatim
/// so a score can always be re-derived and audited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, String>);

impl Answers {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl FromIterator<(String, String)> for Answers {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Score record ────────────────────────────────────────────────────────────

/// Per-category sub-scores. Each is bounded by its category maximum:
/// site 25, permitting 18, architecture 22, resources 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  pub site:         u8,
  pub permitting:   u8,
  pub architecture: u8,
  pub resources:    u8,
}

/// Label bands over the total score. Closed-open intervals; the highest
/// qualifying band wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreCategory {
  #[serde(rename = "Excellent Potential")]
  ExcellentPotential,
  #[serde(rename = "Good Potential")]
  GoodPotential,
  #[serde(rename = "Moderate Challenges")]
  ModerateChallenges,
  #[serde(rename = "Major Roadblocks")]
  MajorRoadblocks,
}

impl ScoreCategory {
  pub fn for_total(total: u8) -> Self {
    match total {
      76.. => Self::ExcellentPotential,
      51.. => Self::GoodPotential,
      26.. => Self::ModerateChallenges,
      _ => Self::MajorRoadblocks,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::ExcellentPotential => "Excellent Potential",
      Self::GoodPotential => "Good Potential",
      Self::ModerateChallenges => "Moderate Challenges",
      Self::MajorRoadblocks => "Major Roadblocks",
    }
  }
}

/// The derived score: category sub-scores, their sum, and the label band
/// the sum falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
  pub total:     u8,
  pub breakdown: ScoreBreakdown,
  pub category:  ScoreCategory,
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Score a submission. Pure: no I/O, no clock, no randomness — identical
/// input always yields identical output.
pub fn score(answers: &Answers) -> ScoreRecord {
  let site = match answers.get("lot_size") {
    Some("xlarge") => 25,
    Some("large") => 20,
    Some("medium") => 15,
    Some("small") => 10,
    _ => 12,
  };

  // Flat until parcel zoning data is wired in.
  let permitting = 18;

  let architecture = match answers.get("primary_use") {
    Some("rental") => 22,
    Some("family") => 20,
    Some("office") => 18,
    _ => 19,
  };

  // A luxury budget only counts in full when financing is not an open
  // question; an unanswered financing question does not disqualify it.
  let resources = match answers.get("budget_range") {
    Some("luxury") if answers.get("financing") != Some("unsure") => 23,
    Some("premium") => 20,
    Some("standard") => 17,
    _ => 14,
  };

  let total = site + permitting + architecture + resources;

  ScoreRecord {
    total,
    breakdown: ScoreBreakdown { site, permitting, architecture, resources },
    category: ScoreCategory::for_total(total),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
