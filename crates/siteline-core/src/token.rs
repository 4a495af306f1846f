//! Public-access tokens — time-bounded capabilities for anonymous reads.
//!
//! A token grants read access to exactly one assessment until its expiry.
//! Tokens are never updated; expired ones are physically removed by the
//! periodic sweep, and logically invisible to lookups before that.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters a token may contain.
pub const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Fixed token length.
pub const TOKEN_LEN: usize = 12;

/// Default token lifetime, in days.
pub const TOKEN_TTL_DAYS: i64 = 90;

/// The default lifetime applied at creation.
pub fn default_ttl() -> Duration { Duration::days(TOKEN_TTL_DAYS) }

/// Generate a token: [`TOKEN_LEN`] characters drawn uniformly from
/// [`TOKEN_ALPHABET`], independent across calls.
///
/// Collision probability is negligible at this length but never assumed
/// impossible — the store enforces a uniqueness constraint at write time
/// and regenerates on conflict.
pub fn generate(rng: &mut impl Rng) -> String {
  (0..TOKEN_LEN)
    .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
    .collect()
}

/// A stored token, linked to the assessment it grants access to.
///
/// Created atomically alongside its assessment; deleting it never affects
/// the assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTokenRecord {
  pub token:         String,
  pub assessment_id: Uuid,
  pub created_at:    DateTime<Utc>,
  pub expires_at:    DateTime<Utc>,
}

impl PublicTokenRecord {
  /// Logical expiry check — the same rule lookups apply at read time,
  /// independent of when the sweeper last ran.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at <= now
  }
}
