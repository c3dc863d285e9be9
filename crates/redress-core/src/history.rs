//! Audit trail records. One entry per mutation, append-only, never edited
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::{ComplaintNo, Status};

/// What kind of mutation produced an entry. Reopen is its own kind so the
/// one sanctioned backward move always stands out in the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
  Created,
  Assigned,
  StatusChanged,
  Reopened,
}

impl HistoryKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Assigned => "assigned",
      Self::StatusChanged => "status_changed",
      Self::Reopened => "reopened",
    }
  }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub history_id:   Uuid,
  pub complaint_no: ComplaintNo,
  /// Who performed the mutation.
  pub actor_id:     Uuid,
  pub kind:         HistoryKind,
  /// Absent on the `Created` entry.
  pub from_status:  Option<Status>,
  pub to_status:    Status,
  pub remark:       Option<String>,
  pub recorded_at:  DateTime<Utc>,
}
