//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings at millisecond precision — fixed width,
//! so lexicographic `ORDER BY` matches chronological order and SQLite's
//! `julianday()` can parse them. UUIDs are hyphenated lowercase strings.
//! Enums are stored as their serde snake_case discriminants.

use chrono::{DateTime, SecondsFormat, Utc};
use redress_core::{
  actor::{Actor, Role},
  category::Category,
  complaint::{AttachmentRef, Complaint, ComplaintNo, Priority, Status},
  feedback::Feedback,
  history::{HistoryEntry, HistoryKind},
  notification::Notification,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ComplaintNo ─────────────────────────────────────────────────────────────

pub fn encode_complaint_no(no: ComplaintNo) -> String { no.to_string() }

pub fn decode_complaint_no(s: &str) -> Result<ComplaintNo> {
  Ok(s.parse().map_err(Error::Core)?)
}

// ─── Enum discriminants ──────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "student" => Ok(Role::Student),
    "faculty" => Ok(Role::Faculty),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "pending" => Ok(Status::Pending),
    "in_progress" => Ok(Status::InProgress),
    "resolved" => Ok(Status::Resolved),
    "closed" => Ok(Status::Closed),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

pub fn decode_priority(s: &str) -> Result<Priority> {
  match s {
    "low" => Ok(Priority::Low),
    "medium" => Ok(Priority::Medium),
    "high" => Ok(Priority::High),
    other => Err(Error::Decode(format!("unknown priority: {other:?}"))),
  }
}

pub fn decode_history_kind(s: &str) -> Result<HistoryKind> {
  match s {
    "created" => Ok(HistoryKind::Created),
    "assigned" => Ok(HistoryKind::Assigned),
    "status_changed" => Ok(HistoryKind::StatusChanged),
    "reopened" => Ok(HistoryKind::Reopened),
    other => Err(Error::Decode(format!("unknown history kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// The fixed column order used by every complaint-returning query.
pub const COMPLAINT_COLUMNS: &str = "c.complaint_no, c.title, c.description, \
  c.category_id, c.priority, c.status, c.created_by, c.assigned_to, \
  c.attachment_path, c.attachment_size, c.attachment_media_type, \
  c.created_at, c.updated_at, c.resolved_at";

/// Raw strings read directly from a `complaints` row.
pub struct RawComplaint {
  pub complaint_no:          String,
  pub title:                 String,
  pub description:           String,
  pub category_id:           String,
  pub priority:              String,
  pub status:                String,
  pub created_by:            String,
  pub assigned_to:           Option<String>,
  pub attachment_path:       Option<String>,
  pub attachment_size:       Option<i64>,
  pub attachment_media_type: Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
  pub resolved_at:           Option<String>,
}

impl RawComplaint {
  /// Read a row laid out as [`COMPLAINT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      complaint_no:          row.get(0)?,
      title:                 row.get(1)?,
      description:           row.get(2)?,
      category_id:           row.get(3)?,
      priority:              row.get(4)?,
      status:                row.get(5)?,
      created_by:            row.get(6)?,
      assigned_to:           row.get(7)?,
      attachment_path:       row.get(8)?,
      attachment_size:       row.get(9)?,
      attachment_media_type: row.get(10)?,
      created_at:            row.get(11)?,
      updated_at:            row.get(12)?,
      resolved_at:           row.get(13)?,
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    let attachment = match (
      self.attachment_path,
      self.attachment_size,
      self.attachment_media_type,
    ) {
      (Some(path), Some(size), Some(media_type)) => Some(AttachmentRef {
        path,
        size_bytes: size as u64,
        media_type,
      }),
      _ => None,
    };

    Ok(Complaint {
      complaint_no: decode_complaint_no(&self.complaint_no)?,
      title: self.title,
      description: self.description,
      category_id: decode_uuid(&self.category_id)?,
      priority: decode_priority(&self.priority)?,
      status: decode_status(&self.status)?,
      created_by: decode_uuid(&self.created_by)?,
      assigned_to: self.assigned_to.as_deref().map(decode_uuid).transpose()?,
      attachment,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      resolved_at: self.resolved_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from an `actors` row (hash excluded).
pub struct RawActor {
  pub actor_id:     String,
  pub username:     String,
  pub display_name: String,
  pub role:         String,
  pub created_at:   String,
}

impl RawActor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      actor_id:     row.get(0)?,
      username:     row.get(1)?,
      display_name: row.get(2)?,
      role:         row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_actor(self) -> Result<Actor> {
    Ok(Actor {
      actor_id:     decode_uuid(&self.actor_id)?,
      username:     self.username,
      display_name: self.display_name,
      role:         decode_role(&self.role)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `categories` row.
pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub parent_id:   Option<String>,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawCategory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      category_id: row.get(0)?,
      name:        row.get(1)?,
      parent_id:   row.get(2)?,
      description: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      parent_id:   self.parent_id.as_deref().map(decode_uuid).transpose()?,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `complaint_history` row.
pub struct RawHistoryEntry {
  pub history_id:   String,
  pub complaint_no: String,
  pub actor_id:     String,
  pub kind:         String,
  pub from_status:  Option<String>,
  pub to_status:    String,
  pub remark:       Option<String>,
  pub recorded_at:  String,
}

impl RawHistoryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:   row.get(0)?,
      complaint_no: row.get(1)?,
      actor_id:     row.get(2)?,
      kind:         row.get(3)?,
      from_status:  row.get(4)?,
      to_status:    row.get(5)?,
      remark:       row.get(6)?,
      recorded_at:  row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      history_id:   decode_uuid(&self.history_id)?,
      complaint_no: decode_complaint_no(&self.complaint_no)?,
      actor_id:     decode_uuid(&self.actor_id)?,
      kind:         decode_history_kind(&self.kind)?,
      from_status:  self.from_status.as_deref().map(decode_status).transpose()?,
      to_status:    decode_status(&self.to_status)?,
      remark:       self.remark,
      recorded_at:  decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `feedback` row.
pub struct RawFeedback {
  pub feedback_id:  String,
  pub complaint_no: String,
  pub actor_id:     String,
  pub rating:       i64,
  pub comment:      Option<String>,
  pub created_at:   String,
}

impl RawFeedback {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      feedback_id:  row.get(0)?,
      complaint_no: row.get(1)?,
      actor_id:     row.get(2)?,
      rating:       row.get(3)?,
      comment:      row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      feedback_id:  decode_uuid(&self.feedback_id)?,
      complaint_no: decode_complaint_no(&self.complaint_no)?,
      actor_id:     decode_uuid(&self.actor_id)?,
      rating:       self.rating as u8,
      comment:      self.comment,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub actor_id:        String,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      actor_id:        row.get(1)?,
      message:         row.get(2)?,
      is_read:         row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      actor_id:        decode_uuid(&self.actor_id)?,
      message:         self.message,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
