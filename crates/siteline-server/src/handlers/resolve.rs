//! `GET /public/{token}` — anonymous read via public-access token.
//!
//! Expiry is checked at read time against the request clock; a token the
//! sweeper has not physically removed yet is still unresolvable once past
//! its deadline.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use siteline_core::{assessment::PublicAssessmentView, store::AssessmentStore};

use crate::{AppState, error::Error};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Path(token): Path<String>,
) -> Result<Json<PublicAssessmentView>, Error>
where
  S: AssessmentStore + Clone,
{
  let assessment = state
    .store
    .resolve_token(&token, Utc::now())
    .await
    .map_err(Error::internal)?
    .ok_or(Error::NotFound)?;
  Ok(Json(assessment.public_view()))
}
