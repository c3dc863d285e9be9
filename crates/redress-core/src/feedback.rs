//! Resolution feedback: at most one per complaint, written by its creator
//! once work has concluded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::ComplaintNo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub feedback_id:  Uuid,
  pub complaint_no: ComplaintNo,
  pub actor_id:     Uuid,
  /// 1 (worst) to 5 (best).
  pub rating:       u8,
  pub comment:      Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`ComplaintStore::add_feedback`](crate::store::ComplaintStore::add_feedback).
#[derive(Debug, Clone)]
pub struct NewFeedback {
  pub complaint_no: ComplaintNo,
  pub actor_id:     Uuid,
  pub rating:       u8,
  pub comment:      Option<String>,
}
