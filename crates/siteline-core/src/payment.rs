//! Payment ledger entries and the external event they are derived from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a ledger entry. The reconciler only processes completed
/// checkout events, so `Completed` is the only status ever recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Completed,
}

/// Append-only ledger entry.
///
/// `session_id` is the external payment-session identifier and doubles as
/// the idempotency key: at most one record ever exists per session id,
/// enforced at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
  pub session_id:    String,
  pub assessment_id: Uuid,
  /// Amount in the currency's minor unit (cents).
  pub amount_total:  i64,
  pub currency:      String,
  pub status:        PaymentStatus,
  pub created_at:    DateTime<Utc>,
}

/// Decoded payment-event payload, as delivered by the provider webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
  pub event_type:    String,
  pub session_id:    String,
  pub assessment_id: Uuid,
  /// Amount in the currency's minor unit (cents).
  pub amount:        i64,
  pub currency:      String,
  /// Provider price identifier; maps to a tier via deployment
  /// configuration, not a core invariant.
  #[serde(default)]
  pub price_id:      Option<String>,
}
