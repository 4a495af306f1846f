//! `GET /assessments/{id}` — full record, including the answers snapshot.

use axum::{
  Json,
  extract::{Path, State},
};
use siteline_core::{assessment::Assessment, store::AssessmentStore};
use uuid::Uuid;

use crate::{AppState, error::Error};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assessment>, Error>
where
  S: AssessmentStore + Clone,
{
  let assessment = state
    .store
    .get(id)
    .await
    .map_err(Error::internal)?
    .ok_or(Error::NotFound)?;
  Ok(Json(assessment))
}
