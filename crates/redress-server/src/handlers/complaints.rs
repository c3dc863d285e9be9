//! Handlers for `/api/complaints` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/complaints` | Filters + pagination, scoped to the actor |
//! | `POST` | `/api/complaints` | Body: [`NewComplaintBody`]; 201 + complaint |
//! | `GET`  | `/api/complaints/{no}` | Single complaint |
//! | `POST` | `/api/complaints/{no}/assign` | Admin-only |
//! | `POST` | `/api/complaints/{no}/status` | One forward step |
//! | `POST` | `/api/complaints/{no}/reopen` | Admin-only, config-gated |
//! | `GET`  | `/api/complaints/{no}/history` | Chronological audit trail |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use redress_core::{
  complaint::{AttachmentRef, Complaint, ComplaintNo, Priority, Status},
  engine::{NewComplaintInput, StatusUpdateInput},
  history::HistoryEntry,
  store::{ComplaintQuery, ComplaintStore},
};

use crate::{AppState, auth::AuthedActor, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status:      Option<Status>,
  pub priority:    Option<Priority>,
  pub category_id: Option<Uuid>,
  pub assigned_to: Option<Uuid>,
  pub created_by:  Option<Uuid>,
  /// Free-text filter over title, description and identifier.
  pub search:      Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

impl From<ListParams> for ComplaintQuery {
  fn from(p: ListParams) -> Self {
    ComplaintQuery {
      status:      p.status,
      priority:    p.priority,
      category_id: p.category_id,
      assigned_to: p.assigned_to,
      created_by:  p.created_by,
      text:        p.search,
      limit:       p.limit,
      offset:      p.offset,
    }
  }
}

/// `GET /api/complaints?[status=...][&priority=...][&search=...][&limit=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.list(&actor, params.into()).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/complaints`.
#[derive(Debug, Deserialize)]
pub struct NewComplaintBody {
  pub title:       String,
  pub description: String,
  pub category_id: Uuid,
  #[serde(default)]
  pub priority:    Priority,
  /// Reference to an already-staged upload; validated at this boundary.
  pub attachment:  Option<AttachmentRef>,
}

/// `POST /api/complaints` — returns 201 + the stored complaint.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Json(body): Json<NewComplaintBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  let complaint = state
    .engine
    .create(&actor, NewComplaintInput {
      title:       body.title,
      description: body.description,
      category_id: body.category_id,
      priority:    body.priority,
      attachment:  body.attachment,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(complaint)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/complaints/{no}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.complaint(&actor, no).await?))
}

// ─── Assign ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub assignee_id: Uuid,
  pub remark:      Option<String>,
}

/// `POST /api/complaints/{no}/assign`
pub async fn assign<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  let complaint = state
    .engine
    .assign(&actor, no, body.assignee_id, body.remark)
    .await?;
  Ok(Json(complaint))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status:          Status,
  pub remark:          Option<String>,
  /// Status the caller last saw; mismatch yields 409 before any write.
  pub observed_status: Option<Status>,
}

/// `POST /api/complaints/{no}/status`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  let complaint = state
    .engine
    .update_status(&actor, no, StatusUpdateInput {
      new_status:      body.status,
      remark:          body.remark,
      observed_status: body.observed_status,
    })
    .await?;
  Ok(Json(complaint))
}

// ─── Reopen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ReopenBody {
  #[serde(default)]
  pub remark: Option<String>,
}

/// `POST /api/complaints/{no}/reopen` — body may be `{}`.
pub async fn reopen<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
  Json(body): Json<ReopenBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.reopen(&actor, no, body.remark).await?))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /api/complaints/{no}/history` — chronological, append-only.
pub async fn history<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(no): Path<ComplaintNo>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.history(&actor, no).await?))
}
