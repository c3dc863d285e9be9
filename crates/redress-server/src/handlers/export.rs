//! Handler for `/api/export` — the admin-only CSV snapshot for offline
//! reporting. A read-only projection; nothing here touches the state
//! machine.

use axum::{
  extract::{Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use redress_core::{
  complaint::{Priority, Status},
  store::{ComplaintQuery, ComplaintStore},
};

use crate::{AppState, auth::AuthedActor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub status:      Option<Status>,
  pub priority:    Option<Priority>,
  pub category_id: Option<Uuid>,
  /// If `true`, a second CSV section with the audit trail follows the
  /// complaint rows, separated by a blank line.
  #[serde(default)]
  pub history:     bool,
}

const COMPLAINT_HEADER: [&str; 9] = [
  "complaint_no",
  "title",
  "status",
  "priority",
  "created_by",
  "assigned_to",
  "category",
  "created_at",
  "resolved_at",
];

const HISTORY_HEADER: [&str; 7] = [
  "complaint_no",
  "kind",
  "actor",
  "from_status",
  "to_status",
  "remark",
  "recorded_at",
];

fn write_section<T: Serialize>(
  header: &[&str],
  rows: &[T],
) -> Result<Vec<u8>, ApiError> {
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(Vec::new());
  writer
    .write_record(header)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  for row in rows {
    writer
      .serialize(row)
      .map_err(|e| ApiError::Internal(e.to_string()))?;
  }
  writer
    .into_inner()
    .map_err(|e| ApiError::Internal(e.to_string()))
}

/// `GET /api/export?[status=...][&history=true]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError>
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  // A snapshot is complete by definition; override the default page size.
  let query = ComplaintQuery {
    status:      params.status,
    priority:    params.priority,
    category_id: params.category_id,
    limit:       Some(u32::MAX as usize),
    ..Default::default()
  };

  let rows = state.engine.export_rows(&actor, &query).await?;
  let mut body = write_section(&COMPLAINT_HEADER, &rows)?;

  if params.history {
    let history = state.engine.export_history_rows(&actor, &query).await?;
    body.push(b'\n');
    body.extend(write_section(&HISTORY_HEADER, &history)?);
  }

  let filename = format!("complaints_{}.csv", Utc::now().format("%Y%m%d"));
  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"{filename}\""),
        ),
      ],
      body,
    )
      .into_response(),
  )
}
