//! Actors — the authenticated identities that drive the workflow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow role. Assigned at registration and immutable afterwards; every
/// authorization decision starts from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Faculty,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Student => "student",
      Self::Faculty => "faculty",
      Self::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An authenticated identity. Credentials never live on this struct; the
/// backend keeps the argon2 hash and surfaces it only through
/// [`ComplaintStore::password_hash`](crate::store::ComplaintStore::password_hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
  pub actor_id:     Uuid,
  pub username:     String,
  pub display_name: String,
  pub role:         Role,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`ComplaintStore::add_actor`](crate::store::ComplaintStore::add_actor).
#[derive(Debug, Clone)]
pub struct NewActor {
  pub username:      String,
  pub display_name:  String,
  pub role:          Role,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
