//! Handlers for `/api/complaints/{no}/feedback`.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use redress_core::{
  complaint::ComplaintNo, feedback::Feedback, store::ComplaintStore,
};

use crate::{AppState, auth::AuthedActor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
  pub rating:  u8,
  pub comment: Option<String>,
}

/// `POST /api/complaints/{no}/feedback` — creator-only, once.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
  Json(body): Json<FeedbackBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  let feedback = state
    .engine
    .add_feedback(&actor, no, body.rating, body.comment)
    .await?;
  Ok((StatusCode::CREATED, Json(feedback)))
}

/// `GET /api/complaints/{no}/feedback` — `null` when none exists yet.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
) -> Result<Json<Option<Feedback>>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.feedback_for(&actor, no).await?))
}
