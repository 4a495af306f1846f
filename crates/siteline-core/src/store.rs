//! The `AssessmentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `siteline-store-sqlite`). The engine and server depend on this
//! abstraction, not on any concrete backend.
//!
//! Every mutation is a conditional operation keyed by assessment
//! identifier: callers never read-modify-write, so concurrent transitions,
//! upgrades and duplicate webhook deliveries serialize per record without a
//! global lock.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  assessment::{Assessment, NewAssessment, Tier},
  payment::PaymentRecord,
  report::ReportContent,
  token::PublicTokenRecord,
};

/// Abstraction over an assessment store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AssessmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an assessment in `processing` status together with its linked
  /// public token, as one atomic unit — both rows land or neither does.
  ///
  /// The store assigns the identifier and creation timestamp, generates
  /// the token, and regenerates on a uniqueness conflict.
  fn create(
    &self,
    new: NewAssessment,
  ) -> impl Future<Output = Result<(Assessment, PublicTokenRecord), Self::Error>> + Send + '_;

  /// Transition `processing` → `completed`, setting the report content and
  /// the processed timestamp.
  ///
  /// Returns `false` — changing nothing — when the record is already
  /// terminal, so the enrichment worker's retries cannot corrupt state.
  /// Errors when no record with `id` exists.
  fn mark_completed(
    &self,
    id: Uuid,
    report: ReportContent,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Transition `processing` → `error`, recording a human-readable cause.
  /// Same idempotency rule as [`mark_completed`](Self::mark_completed).
  fn mark_error(
    &self,
    id: Uuid,
    detail: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Raise the tier and set the paid timestamp, only when `tier` is
  /// strictly higher than the stored one.
  ///
  /// Returns `false` on same-or-lower requests; that monotonic guard is
  /// what makes duplicate payment delivery safe to replay.
  fn upgrade_tier(
    &self,
    id: Uuid,
    tier: Tier,
    paid_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch by identifier. Returns `None` when absent.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assessment>, Self::Error>> + Send + '_;

  /// Resolve a public token to its assessment.
  ///
  /// Returns `None` when the token is absent *or* its expiry is at or
  /// before `now` — logical expiry is checked here, never deferred to the
  /// physical sweep.
  fn resolve_token<'a>(
    &'a self,
    token: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Assessment>, Self::Error>> + Send + 'a;

  /// Append a ledger entry.
  ///
  /// Returns `false` when a record with the same session id already
  /// exists. The uniqueness must be enforced by the storage layer, not an
  /// application-level check: duplicate deliveries can arrive
  /// concurrently.
  fn record_payment(
    &self,
    record: PaymentRecord,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All ledger entries referencing one assessment, oldest first.
  fn payments_for(
    &self,
    assessment_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PaymentRecord>, Self::Error>> + Send + '_;

  /// Delete every token whose expiry is strictly before `now`, as one
  /// bulk operation. Returns the number removed.
  fn sweep_expired_tokens(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
