//! The `ComplaintStore` trait and supporting query/input types.
//!
//! The trait is implemented by storage backends (e.g.
//! `redress-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! Mutations are transition-shaped: each input carries everything the
//! backend needs to perform the entity update and its audit record in one
//! atomic unit, re-checking the expected status inside that unit
//! (optimistic concurrency).
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  actor::{Actor, NewActor, Role},
  category::{Category, NewCategory},
  complaint::{AttachmentRef, Complaint, ComplaintNo, Priority, Status},
  feedback::{Feedback, NewFeedback},
  history::{HistoryEntry, HistoryKind},
  notification::Notification,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ComplaintStore::list_complaints`] and
/// [`ComplaintStore::complaint_stats`].
#[derive(Debug, Clone, Default)]
pub struct ComplaintQuery {
  pub status:      Option<Status>,
  pub priority:    Option<Priority>,
  pub category_id: Option<Uuid>,
  pub assigned_to: Option<Uuid>,
  pub created_by:  Option<Uuid>,
  /// Free-text filter over title, description and identifier.
  pub text:        Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

/// Dashboard counts, computed over one [`ComplaintQuery`] scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintStats {
  pub total:               u64,
  pub pending:             u64,
  pub in_progress:         u64,
  pub resolved:            u64,
  pub closed:              u64,
  pub high_priority:       u64,
  pub by_category:         Vec<CategoryCount>,
  /// Mean seconds from creation to resolution, over complaints that have a
  /// resolution timestamp. `None` when nothing has been resolved yet.
  pub avg_resolution_secs: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
  pub category_id: Uuid,
  pub name:        String,
  pub count:       u64,
}

// ─── Mutation inputs ─────────────────────────────────────────────────────────

/// Input to [`ComplaintStore::create_complaint`]. The identifier, the
/// timestamps and the `Created` history entry are minted by the store,
/// inside the same transaction as the insert.
#[derive(Debug, Clone)]
pub struct NewComplaint {
  pub title:       String,
  pub description: String,
  pub category_id: Uuid,
  pub priority:    Priority,
  pub created_by:  Uuid,
  pub attachment:  Option<AttachmentRef>,
}

/// Input to [`ComplaintStore::assign_complaint`].
#[derive(Debug, Clone)]
pub struct AssignmentInput {
  pub complaint_no:    ComplaintNo,
  /// The admin performing the assignment; attributed in the audit trail.
  pub actor_id:        Uuid,
  pub assignee_id:     Uuid,
  /// Status the caller observed. The store fails with a conflict if the
  /// stored status no longer matches.
  pub expected_status: Status,
  pub new_status:      Status,
  pub remark:          Option<String>,
}

/// Input to [`ComplaintStore::transition_complaint`].
#[derive(Debug, Clone)]
pub struct TransitionInput {
  pub complaint_no:    ComplaintNo,
  pub actor_id:        Uuid,
  /// Status the caller observed. The store fails with a conflict if the
  /// stored status no longer matches.
  pub expected_status: Status,
  pub new_status:      Status,
  /// `StatusChanged` for forward moves, `Reopened` for the sanctioned
  /// backward move.
  pub kind:            HistoryKind,
  pub remark:          Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Redress storage backend.
///
/// Each mutating method is a single atomic unit of work: either the entity
/// change and its history entry are both committed, or neither is.
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Actors ────────────────────────────────────────────────────────────

  /// Persist a new actor. Fails with a conflict on a duplicate username.
  fn add_actor(
    &self,
    input: NewActor,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  fn actor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + '_;

  fn actor_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + 'a;

  /// Argon2 PHC string for `username`, if such an actor exists. Only the
  /// HTTP auth layer calls this.
  fn password_hash<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  fn list_actors(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<Actor>, Self::Error>> + Send + '_;

  // ── Categories ────────────────────────────────────────────────────────

  /// Persist a new category. Fails with a conflict on a duplicate name.
  fn add_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  // ── Complaints ────────────────────────────────────────────────────────

  /// Mint the identifier (next per-date sequence), insert the complaint
  /// and its `Created` history entry — all in one transaction, so two
  /// concurrent creates on the same date can never produce the same
  /// identifier.
  fn create_complaint(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  fn complaint(
    &self,
    no: ComplaintNo,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  fn list_complaints<'a>(
    &'a self,
    query: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Set the assignee (and possibly move Pending → InProgress), writing
  /// the `Assigned` history entry in the same transaction.
  fn assign_complaint(
    &self,
    input: AssignmentInput,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  /// Apply a status transition, writing its history entry in the same
  /// transaction. Entering `Resolved` stamps `resolved_at`; a `Reopened`
  /// transition clears it.
  fn transition_complaint(
    &self,
    input: TransitionInput,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Persist feedback. Fails with a conflict if feedback already exists
  /// for the complaint; the at-most-one rule is enforced by the backend.
  fn add_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  fn feedback(
    &self,
    no: ComplaintNo,
  ) -> impl Future<Output = Result<Option<Feedback>, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// The chronological audit trail for one complaint. Append-only: the
  /// returned sequence only ever grows.
  fn history(
    &self,
    no: ComplaintNo,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn add_notification(
    &self,
    actor_id: Uuid,
    message: String,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  fn list_notifications(
    &self,
    actor_id: Uuid,
    unread_only: bool,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  // ── Stats ─────────────────────────────────────────────────────────────

  /// Dashboard counts over the complaints matched by `scope` (its
  /// `limit`/`offset` are ignored).
  fn complaint_stats<'a>(
    &'a self,
    scope: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<ComplaintStats, Self::Error>> + Send + 'a;
}
