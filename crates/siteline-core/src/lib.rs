//! Core types and trait definitions for the Siteline assessment service.
//!
//! Deliberately free of HTTP and database dependencies: the scoring
//! calculator, token generator and store contract live here so every other
//! crate can depend on them without dragging in a backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assessment;
pub mod payment;
pub mod report;
pub mod score;
pub mod store;
pub mod token;
