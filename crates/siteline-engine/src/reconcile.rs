//! Payment reconciliation — one external checkout event, exactly one tier
//! upgrade.
//!
//! At-least-once delivery is the assumption, not the exception. The
//! ledger's session-id primary key decides which delivery is first; every
//! later copy is acknowledged without effect. Verification fails closed: an
//! unauthenticated delivery takes no state action at all.

use std::collections::HashMap;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq as _;

use siteline_core::{
  assessment::Tier,
  payment::{PaymentEvent, PaymentRecord, PaymentStatus},
  store::AssessmentStore,
};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// The event type carrying a finished checkout. Every other type is
/// acknowledged and dropped.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

// ─── Tier schedule ───────────────────────────────────────────────────────────

/// Maps provider price identifiers to the tier they unlock.
///
/// Deployment configuration, not a core invariant: unknown or absent price
/// ids take the default tier.
#[derive(Debug, Clone)]
pub struct TierSchedule {
  default_tier: Tier,
  by_price:     HashMap<String, Tier>,
}

impl TierSchedule {
  pub fn new(default_tier: Tier) -> Self {
    Self { default_tier, by_price: HashMap::new() }
  }

  pub fn with_price(mut self, price_id: impl Into<String>, tier: Tier) -> Self {
    self.by_price.insert(price_id.into(), tier);
    self
  }

  pub fn tier_for(&self, price_id: Option<&str>) -> Tier {
    price_id
      .and_then(|p| self.by_price.get(p).copied())
      .unwrap_or(self.default_tier)
  }
}

impl Default for TierSchedule {
  fn default() -> Self { Self::new(Tier::Tier2) }
}

// ─── Signature verification ──────────────────────────────────────────────────

/// Verify a `t=<unix>,v1=<hex>` signature header: HMAC-SHA256 over
/// `"{t}.{body}"` with the shared secret. Fails closed on any malformation.
pub fn verify_signature(secret: &[u8], header: &str, body: &[u8]) -> Result<()> {
  let (timestamp, provided_hex) = parse_signature_header(header)?;

  let provided = hex::decode(provided_hex).map_err(|_| Error::InvalidSignature)?;
  let expected = compute_signature(secret, timestamp, body);

  if provided.len() != expected.len() {
    return Err(Error::InvalidSignature);
  }
  if !bool::from(provided.ct_eq(&expected)) {
    return Err(Error::InvalidSignature);
  }
  Ok(())
}

/// Produce the signature header for a payload, the way the provider does.
/// Used by tests and local tooling to fabricate valid deliveries.
pub fn sign(secret: &[u8], timestamp: i64, body: &[u8]) -> String {
  let digest = compute_signature(secret, &timestamp.to_string(), body);
  format!("t={timestamp},v1={}", hex::encode(digest))
}

fn compute_signature(secret: &[u8], timestamp: &str, body: &[u8]) -> Vec<u8> {
  let mut mac =
    HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
  mac.update(timestamp.as_bytes());
  mac.update(b".");
  mac.update(body);
  mac.finalize().into_bytes().to_vec()
}

fn parse_signature_header(header: &str) -> Result<(&str, &str)> {
  let mut timestamp = None;
  let mut v1 = None;

  for part in header.split(',') {
    match part.trim().split_once('=') {
      Some(("t", value)) => timestamp = Some(value),
      Some(("v1", value)) => v1 = Some(value),
      _ => {}
    }
  }

  match (timestamp, v1) {
    (Some(t), Some(sig)) => Ok((t, sig)),
    _ => Err(Error::InvalidSignature),
  }
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// What the reconciler did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// First delivery of this session: ledger entry appended, tier upgrade
  /// applied (or found already applied).
  Processed,
  /// Acknowledged without a ledger append: a replayed session id, or an
  /// event type this engine does not handle.
  Ignored,
}

/// Verify and apply one payment-event delivery.
///
/// The ledger append happens-before the tier upgrade, and the upgrade is
/// re-attempted even on replays: if a crash lands between the two writes,
/// the next delivery of the same session heals the gap. The monotonic
/// guard in the store makes the re-attempt a no-op whenever the upgrade
/// already took.
pub async fn reconcile<S>(
  store: &S,
  schedule: &TierSchedule,
  secret: &[u8],
  signature_header: Option<&str>,
  body: &[u8],
) -> Result<Outcome>
where
  S: AssessmentStore,
{
  let header = signature_header.ok_or(Error::InvalidSignature)?;
  verify_signature(secret, header, body)?;

  let event: PaymentEvent = serde_json::from_slice(body)?;

  if event.event_type != CHECKOUT_COMPLETED {
    tracing::debug!(event_type = %event.event_type, "unhandled payment event type");
    return Ok(Outcome::Ignored);
  }

  // Fail safe: a payment for an assessment this store has never seen is an
  // integration fault, not something to reconcile quietly.
  store
    .get(event.assessment_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::UnknownAssessment(event.assessment_id))?;

  let record = PaymentRecord {
    session_id:    event.session_id.clone(),
    assessment_id: event.assessment_id,
    amount_total:  event.amount,
    currency:      event.currency.clone(),
    status:        PaymentStatus::Completed,
    created_at:    Utc::now(),
  };

  let first_delivery = store.record_payment(record).await.map_err(Error::store)?;

  let tier = schedule.tier_for(event.price_id.as_deref());
  let upgraded = store
    .upgrade_tier(event.assessment_id, tier, Utc::now())
    .await
    .map_err(Error::store)?;

  if first_delivery {
    tracing::info!(
      session_id = %event.session_id,
      assessment_id = %event.assessment_id,
      ?tier,
      upgraded,
      "payment reconciled"
    );
    Ok(Outcome::Processed)
  } else {
    tracing::info!(
      session_id = %event.session_id,
      assessment_id = %event.assessment_id,
      "duplicate payment delivery ignored"
    );
    Ok(Outcome::Ignored)
  }
}
