//! The classification registry.
//!
//! Categories are read-only reference data with no lifecycle. A
//! subcategory is simply a category whose `parent_id` points at another
//! category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  pub name:        String,
  pub parent_id:   Option<Uuid>,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`ComplaintStore::add_category`](crate::store::ComplaintStore::add_category).
#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name:        String,
  pub parent_id:   Option<Uuid>,
  pub description: Option<String>,
}
