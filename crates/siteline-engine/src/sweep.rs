//! Periodic deletion of expired public tokens.

use std::time::Duration;

use chrono::Utc;
use siteline_core::store::AssessmentStore;

/// Default period between sweeps.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Delete every token already past its expiry; returns the count removed.
///
/// Safe to run concurrently with token creation and resolution: it only
/// touches tokens that `resolve_token` already refuses, so a
/// resolve-then-sweep race can never hand out a token the sweep was about
/// to remove.
pub async fn sweep_once<S>(store: &S) -> Result<u64, S::Error>
where
  S: AssessmentStore,
{
  let deleted = store.sweep_expired_tokens(Utc::now()).await?;
  if deleted > 0 {
    tracing::info!(deleted, "expired public tokens removed");
  }
  Ok(deleted)
}

/// Run the sweep forever on a fixed period.
///
/// A missed run is self-healing — expiry is by timestamp, not by counter,
/// so the next run catches up on everything the missed one would have
/// removed.
pub async fn run<S>(store: &S, period: Duration)
where
  S: AssessmentStore,
{
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

  // The first tick fires immediately; sweeping at startup is harmless.
  loop {
    ticker.tick().await;
    if let Err(e) = sweep_once(store).await {
      tracing::error!(error = %e, "token sweep failed");
    }
  }
}
