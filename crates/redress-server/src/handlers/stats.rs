//! Handler for `/api/stats` — dashboard counts over the actor's visible
//! slice of the complaint pool.

use axum::{Json, extract::State};

use redress_core::store::{ComplaintStats, ComplaintStore};

use crate::{AppState, auth::AuthedActor, error::ApiError};

/// `GET /api/stats`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
) -> Result<Json<ComplaintStats>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.stats(&actor).await?))
}
