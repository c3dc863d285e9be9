//! Handlers for `/api/notifications`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use redress_core::{notification::Notification, store::ComplaintStore};

use crate::{AppState, auth::AuthedActor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, only unread notifications are returned.
  #[serde(default)]
  pub unread: bool,
}

/// `GET /api/notifications[?unread=true]` — the actor's own inbox.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(
    state.engine.notifications(&actor, params.unread).await?,
  ))
}

/// `POST /api/notifications/{id}/read` — owner-only.
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.mark_notification_read(&actor, id).await?))
}
