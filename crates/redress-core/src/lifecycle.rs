//! The status workflow: strictly forward, one step at a time, plus one
//! explicitly logged backward move (reopen).

use crate::{Error, Result, complaint::Status};

/// The next status in the forward workflow, if any.
pub fn successor(status: Status) -> Option<Status> {
  match status {
    Status::Pending => Some(Status::InProgress),
    Status::InProgress => Some(Status::Resolved),
    Status::Resolved => Some(Status::Closed),
    Status::Closed => None,
  }
}

/// Validate a forward transition: exactly one step, never backward, never
/// skipping. Reopen is not a forward transition; see [`validate_reopen`].
pub fn validate_transition(from: Status, to: Status) -> Result<()> {
  if successor(from) == Some(to) {
    return Ok(());
  }
  let reason = if from == to {
    "status is unchanged".to_string()
  } else {
    format!("cannot move to {to}")
  };
  Err(Error::State { current: from, reason })
}

/// Where a reopened complaint lands.
pub const REOPEN_TARGET: Status = Status::InProgress;

/// Reopen is only meaningful once work has concluded.
pub fn validate_reopen(from: Status) -> Result<()> {
  match from {
    Status::Resolved | Status::Closed => Ok(()),
    current => Err(Error::State {
      current,
      reason: "only resolved or closed complaints can be reopened".to_string(),
    }),
  }
}
