//! The assessment lifecycle and reconciliation engine.
//!
//! Everything in this crate is generic over
//! [`AssessmentStore`](siteline_core::store::AssessmentStore): intake,
//! the enrichment worker, payment reconciliation and the token sweeper all
//! speak to storage through that trait. Transport and persistence live in
//! sibling crates.

pub mod enrich;
pub mod error;
pub mod intake;
pub mod notify;
pub mod reconcile;
pub mod sweep;

pub use error::{Error, Result};
