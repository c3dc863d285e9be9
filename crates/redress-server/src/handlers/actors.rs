//! Handlers for registration and actor administration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/register` | Open; role restricted to student/faculty |
//! | `POST` | `/api/actors` | Admin-only; any role |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use redress_core::{
  Error as CoreError,
  actor::{Actor, NewActor, Role},
  store::ComplaintStore,
};

use crate::{
  AppState,
  auth::{AuthedActor, hash_password},
  error::ApiError,
};

/// JSON body accepted by both registration endpoints.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:     String,
  pub display_name: String,
  pub password:     String,
  pub role:         Role,
}

fn validate(body: &RegisterBody) -> Result<(), ApiError> {
  if body.username.trim().is_empty() {
    return Err(
      CoreError::Validation {
        field:  "username",
        reason: "must not be empty".to_string(),
      }
      .into(),
    );
  }
  if body.display_name.trim().is_empty() {
    return Err(
      CoreError::Validation {
        field:  "display_name",
        reason: "must not be empty".to_string(),
      }
      .into(),
    );
  }
  if body.password.len() < 8 {
    return Err(
      CoreError::Validation {
        field:  "password",
        reason: "must be at least 8 characters".to_string(),
      }
      .into(),
    );
  }
  Ok(())
}

async fn insert_actor<S>(
  state: &AppState<S>,
  body: RegisterBody,
) -> Result<Actor, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  validate(&body)?;
  let password_hash = hash_password(&body.password)?;
  state
    .engine
    .store()
    .add_actor(NewActor {
      username: body.username.trim().to_string(),
      display_name: body.display_name.trim().to_string(),
      role: body.role,
      password_hash,
    })
    .await
    .map_err(|e| ApiError::Engine(e.into()))
}

/// `POST /api/register` — open self-registration for students and faculty.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  if body.role == Role::Admin {
    return Err(
      CoreError::Validation {
        field:  "role",
        reason: "admins are provisioned by an administrator".to_string(),
      }
      .into(),
    );
  }
  let actor = insert_actor(&state, body).await?;
  Ok((StatusCode::CREATED, Json(actor)))
}

/// `POST /api/actors` — admin-only creation, any role.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  if actor.role != Role::Admin {
    return Err(
      CoreError::Permission {
        role:   actor.role,
        action: "create actors".to_string(),
      }
      .into(),
    );
  }
  let created = insert_actor(&state, body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}
