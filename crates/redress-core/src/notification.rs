//! Transient per-actor messages produced by lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  /// The recipient. Notifications are only ever visible to their owner.
  pub actor_id:        Uuid,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}
