//! Error type for `redress-store-sqlite`, and its mapping into the core
//! error taxonomy.

use redress_core::complaint::{ComplaintNo, Status};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] redress_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored discriminant string no schema version ever wrote.
  #[error("cannot decode stored value: {0}")]
  Decode(String),

  #[error("complaint not found: {0}")]
  ComplaintNotFound(ComplaintNo),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  /// The expected-status guard failed inside the transaction: someone
  /// else moved the complaint first.
  #[error("complaint {complaint_no} is {current} now, expected {expected}")]
  StatusChanged {
    complaint_no: ComplaintNo,
    expected:     Status,
    current:      Status,
  },

  /// In-transaction re-check of the feedback window failed.
  #[error("feedback not accepted while complaint is {0}")]
  FeedbackState(Status),

  #[error("feedback already exists for {0}")]
  DuplicateFeedback(ComplaintNo),

  #[error("username already taken: {0:?}")]
  DuplicateUsername(String),

  #[error("category already exists: {0:?}")]
  DuplicateCategory(String),

  /// A full million complaints on one date. The allocation rolls back.
  #[error("daily identifier sequence exhausted for {0}")]
  SequenceExhausted(chrono::NaiveDate),
}

impl From<Error> for redress_core::Error {
  fn from(e: Error) -> Self {
    use redress_core::Error as Core;
    match e {
      Error::Core(inner) => inner,
      Error::ComplaintNotFound(no) => Core::ComplaintNotFound(no),
      Error::NotificationNotFound(id) => Core::NotificationNotFound(id),
      Error::StatusChanged { complaint_no, expected, current } => {
        Core::Conflict(format!(
          "complaint {complaint_no} is {current} now, expected {expected}"
        ))
      }
      Error::FeedbackState(current) => Core::State {
        current,
        reason: "feedback is only accepted once resolved".to_string(),
      },
      Error::DuplicateFeedback(no) => {
        Core::Conflict(format!("feedback already exists for {no}"))
      }
      Error::DuplicateUsername(username) => {
        Core::Conflict(format!("username already taken: {username:?}"))
      }
      Error::DuplicateCategory(name) => {
        Core::Conflict(format!("category already exists: {name:?}"))
      }
      Error::SequenceExhausted(date) => {
        Core::Conflict(format!("daily identifier sequence exhausted for {date}"))
      }
      other @ (Error::Database(_) | Error::Uuid(_) | Error::DateParse(_)
      | Error::Decode(_)) => Core::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
