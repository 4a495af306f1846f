//! HTTP transport for the Siteline assessment service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`AssessmentStore`](siteline_core::store::AssessmentStore). The router
//! owns no policy of its own: intake, reconciliation and sweeping live in
//! `siteline-engine`; this crate wires them to routes, config and logging.

pub mod error;
pub mod handlers;

pub use error::Error;

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use siteline_core::{assessment::Tier, store::AssessmentStore};
use siteline_engine::{
  enrich::FeasibilityReportBuilder,
  notify::{LoggingCrm, LoggingNotifier},
  reconcile::TierSchedule,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SITELINE_*` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  /// Shared secret the payment provider signs webhook deliveries with.
  pub webhook_secret: String,

  /// Upper bound on one enrichment run, in seconds. Exceeding it marks
  /// the assessment errored.
  #[serde(default = "default_enrichment_timeout_secs")]
  pub enrichment_timeout_secs: u64,

  /// Period between token sweeps, in seconds.
  #[serde(default = "default_sweep_period_secs")]
  pub sweep_period_secs: u64,

  /// Provider price id → tier overrides, e.g. `price_123 = "tier3"`.
  /// Anything not listed here upgrades to the default tier.
  #[serde(default)]
  pub tier_prices: HashMap<String, Tier>,
}

fn default_enrichment_timeout_secs() -> u64 { 30 }

fn default_sweep_period_secs() -> u64 {
  siteline_engine::sweep::DEFAULT_PERIOD.as_secs()
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AssessmentStore> {
  pub store:     Arc<S>,
  pub config:    Arc<ServerConfig>,
  pub schedule:  Arc<TierSchedule>,
  pub generator: Arc<FeasibilityReportBuilder>,
  pub crm:       Arc<LoggingCrm>,
  pub notifier:  Arc<LoggingNotifier>,
}

impl<S: AssessmentStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let mut schedule = TierSchedule::default();
    for (price, tier) in &config.tier_prices {
      schedule = schedule.with_price(price.clone(), *tier);
    }

    Self {
      store,
      schedule: Arc::new(schedule),
      generator: Arc::new(FeasibilityReportBuilder),
      crm: Arc::new(LoggingCrm),
      notifier: Arc::new(LoggingNotifier),
      config: Arc::new(config),
    }
  }

  pub fn enrichment_timeout(&self) -> Duration {
    Duration::from_secs(self.config.enrichment_timeout_secs)
  }

  pub fn sweep_period(&self) -> Duration {
    Duration::from_secs(self.config.sweep_period_secs)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the assessment service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AssessmentStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(handlers::health::handler))
    .route("/assessments", post(handlers::intake::handler::<S>))
    .route("/assessments/{id}", get(handlers::read::handler::<S>))
    .route("/public/{token}", get(handlers::resolve::handler::<S>))
    .route("/webhooks/payment", post(handlers::webhook::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
