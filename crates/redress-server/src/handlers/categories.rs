//! Handlers for `/api/categories`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use redress_core::{
  category::{Category, NewCategory},
  store::ComplaintStore,
};

use crate::{AppState, auth::AuthedActor, error::ApiError};

/// `GET /api/categories` — the full registry, open to any authenticated
/// actor.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedActor(_actor): AuthedActor,
) -> Result<Json<Vec<Category>>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.categories().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryBody {
  pub name:        String,
  /// Set to nest this entry under an existing category.
  pub parent_id:   Option<Uuid>,
  pub description: Option<String>,
}

/// `POST /api/categories` — admin-only.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Json(body): Json<NewCategoryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  let category = state
    .engine
    .add_category(&actor, NewCategory {
      name:        body.name,
      parent_id:   body.parent_id,
      description: body.description,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(category)))
}
