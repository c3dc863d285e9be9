//! The complaint entity, its public identifier, and the attachment
//! boundary checks.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status & priority ───────────────────────────────────────────────────────

/// Workflow status. Transitions are validated by [`crate::lifecycle`];
/// nothing else may change a complaint's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Pending,
  InProgress,
  Resolved,
  Closed,
}

impl Status {
  /// The discriminant string stored in the `status` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::InProgress => "in_progress",
      Self::Resolved => "resolved",
      Self::Closed => "closed",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

impl Priority {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Largest sequence representable in the six-digit field.
pub const MAX_DAILY_SEQUENCE: u32 = 999_999;

/// The public identifier contract: `CMP-` + 8-digit UTC creation date +
/// `-` + 6-digit zero-padded per-date sequence, e.g. `CMP-20241201-000001`.
///
/// Globally unique and immutable once minted. External consumers may parse
/// the format; it is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintNo {
  date:     NaiveDate,
  sequence: u32,
}

impl ComplaintNo {
  /// Mint an identifier from a creation date and a per-date sequence.
  /// Sequences start at 1.
  pub fn new(date: NaiveDate, sequence: u32) -> Result<Self> {
    if sequence == 0 || sequence > MAX_DAILY_SEQUENCE {
      return Err(Error::Validation {
        field:  "sequence",
        reason: format!("must be 1..={MAX_DAILY_SEQUENCE}, got {sequence}"),
      });
    }
    Ok(Self { date, sequence })
  }

  pub fn date(self) -> NaiveDate { self.date }

  pub fn sequence(self) -> u32 { self.sequence }
}

impl fmt::Display for ComplaintNo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "CMP-{}-{:06}", self.date.format("%Y%m%d"), self.sequence)
  }
}

impl FromStr for ComplaintNo {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let malformed = || Error::MalformedComplaintNo(s.to_string());

    let rest = s.strip_prefix("CMP-").ok_or_else(malformed)?;
    let (date_part, seq_part) = rest.split_once('-').ok_or_else(malformed)?;

    if date_part.len() != 8
      || seq_part.len() != 6
      || !seq_part.bytes().all(|b| b.is_ascii_digit())
    {
      return Err(malformed());
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d")
      .map_err(|_| malformed())?;
    let sequence: u32 = seq_part.parse().map_err(|_| malformed())?;

    Self::new(date, sequence).map_err(|_| malformed())
  }
}

impl TryFrom<String> for ComplaintNo {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<ComplaintNo> for String {
  fn from(no: ComplaintNo) -> Self { no.to_string() }
}

// ─── Attachment reference ────────────────────────────────────────────────────

/// Upload size cap enforced at the boundary.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Extension allow-list enforced at the boundary.
pub const ALLOWED_ATTACHMENT_EXTENSIONS: [&str; 5] =
  ["pdf", "jpg", "jpeg", "png", "docx"];

/// A reference to an uploaded file; no binary data lives in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
  /// Path or object key under the caller's upload area.
  pub path:       String,
  pub size_bytes: u64,
  pub media_type: String,
}

impl AttachmentRef {
  /// Boundary validation: size cap and extension allow-list. Runs before
  /// the reference is ever attached to a complaint.
  pub fn validate(&self) -> Result<()> {
    if self.size_bytes > MAX_ATTACHMENT_BYTES {
      return Err(Error::Validation {
        field:  "attachment",
        reason: format!(
          "file size {} exceeds the {MAX_ATTACHMENT_BYTES}-byte limit",
          self.size_bytes
        ),
      });
    }

    let extension = self
      .path
      .rsplit_once('.')
      .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
      Some(ext) if ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) => {
        Ok(())
      }
      _ => Err(Error::Validation {
        field:  "attachment",
        reason: format!(
          "file type not allowed; allowed types: {}",
          ALLOWED_ATTACHMENT_EXTENSIONS.join(", ")
        ),
      }),
    }
  }
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// The primary trackable entity, filed by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
  pub complaint_no: ComplaintNo,
  pub title:        String,
  pub description:  String,
  pub category_id:  Uuid,
  pub priority:     Priority,
  pub status:       Status,
  pub created_by:   Uuid,
  /// Faculty assignee; empty until an admin assigns the complaint.
  pub assigned_to:  Option<Uuid>,
  pub attachment:   Option<AttachmentRef>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  /// Set when the complaint first enters `Resolved`; cleared by reopen.
  pub resolved_at:  Option<DateTime<Utc>>,
}
