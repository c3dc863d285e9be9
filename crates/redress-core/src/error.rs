//! Error types for `redress-core`.
//!
//! Authorization failures and state-machine failures are deliberately
//! distinct variants, so callers can tell "not allowed for your role" from
//! "not allowed in this state".

use thiserror::Error;
use uuid::Uuid;

use crate::{
  actor::Role,
  complaint::{ComplaintNo, Status},
};

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input; `field` names the offending field.
  #[error("invalid {field}: {reason}")]
  Validation { field: &'static str, reason: String },

  /// The actor's role or relationship to the complaint does not permit the
  /// operation.
  #[error("{role} is not allowed to {action}")]
  Permission { role: Role, action: String },

  /// The operation is legal for the role but not in the current status.
  #[error("not allowed while complaint is {current}: {reason}")]
  State { current: Status, reason: String },

  /// Optimistic-concurrency or uniqueness violation. The caller should
  /// re-fetch and retry.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("complaint not found: {0}")]
  ComplaintNotFound(ComplaintNo),

  #[error("actor not found: {0}")]
  ActorNotFound(Uuid),

  #[error("category not found: {0}")]
  CategoryNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("malformed complaint identifier: {0:?}")]
  MalformedComplaintNo(String),

  /// Backend fault; recoverable at the boundary but not by retrying here.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable discriminant for API consumers. Part of the error contract.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Validation { .. } | Self::MalformedComplaintNo(_) => "validation",
      Self::Permission { .. } => "permission",
      Self::State { .. } => "state",
      Self::Conflict(_) => "conflict",
      Self::ComplaintNotFound(_)
      | Self::ActorNotFound(_)
      | Self::CategoryNotFound(_)
      | Self::NotificationNotFound(_) => "not_found",
      Self::Storage(_) => "storage",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
