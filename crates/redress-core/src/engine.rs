//! The lifecycle engine: authorization, validation and transition rules in
//! front of a [`ComplaintStore`] backend.
//!
//! Every mutating operation resolves the actor's role and relationship,
//! consults the policy table, validates input, validates the state
//! transition, then hands a single atomic operation to the store.
//! Notifications are written after the atomic unit commits — they are
//! transient and not covered by the atomicity guarantee.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::{Actor, Role},
  category::{Category, NewCategory},
  complaint::{AttachmentRef, Complaint, ComplaintNo, MAX_TITLE_CHARS, Priority, Status},
  feedback::{Feedback, NewFeedback},
  history::{HistoryEntry, HistoryKind},
  lifecycle,
  notification::Notification,
  policy::{self, ComplaintAction, Relationship},
  store::{
    AssignmentInput, ComplaintQuery, ComplaintStats, ComplaintStore,
    NewComplaint, TransitionInput,
  },
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Engine policy knobs, passed in at construction — never ambient state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Whether admins may reopen resolved/closed complaints. Off by default:
  /// the workflow is strictly forward unless an operator opts in.
  #[serde(default)]
  pub allow_reopen: bool,
}

// ─── Operation inputs ────────────────────────────────────────────────────────

/// Input to [`LifecycleEngine::create`].
#[derive(Debug, Clone)]
pub struct NewComplaintInput {
  pub title:       String,
  pub description: String,
  pub category_id: Uuid,
  pub priority:    Priority,
  pub attachment:  Option<AttachmentRef>,
}

/// Input to [`LifecycleEngine::update_status`].
#[derive(Debug, Clone)]
pub struct StatusUpdateInput {
  pub new_status:      Status,
  pub remark:          Option<String>,
  /// Status the caller last observed, if it wants conflict detection
  /// against its own read rather than the engine's fresh one.
  pub observed_status: Option<Status>,
}

// ─── Export projections ──────────────────────────────────────────────────────

/// One flattened row of the export snapshot, identifiers resolved to
/// display names. A read-only projection, not part of the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
  pub complaint_no: String,
  pub title:        String,
  pub status:       String,
  pub priority:     String,
  pub created_by:   String,
  /// Empty when unassigned.
  pub assigned_to:  String,
  pub category:     String,
  pub created_at:   String,
  /// Empty when unresolved.
  pub resolved_at:  String,
}

/// One flattened audit-trail row for the optional history section of an
/// export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExportRow {
  pub complaint_no: String,
  pub kind:         String,
  pub actor:        String,
  pub from_status:  String,
  pub to_status:    String,
  pub remark:       String,
  pub recorded_at:  String,
}

// ─── Store error mapping ─────────────────────────────────────────────────────

/// Lifts backend errors into the engine's error taxonomy at each call site.
trait StoreResultExt<T> {
  fn map_store(self) -> Result<T>;
}

impl<T, E: Into<Error>> StoreResultExt<T> for std::result::Result<T, E> {
  fn map_store(self) -> Result<T> { self.map_err(Into::into) }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The complaint lifecycle engine. Cheap to share behind an [`Arc`].
pub struct LifecycleEngine<S> {
  store:  Arc<S>,
  config: EngineConfig,
}

impl<S: ComplaintStore> LifecycleEngine<S> {
  pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
    Self { store, config }
  }

  /// The backing store. The HTTP layer needs it for credential lookups and
  /// actor registration; lifecycle operations never bypass the engine.
  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> EngineConfig { self.config }

  // ── Create ────────────────────────────────────────────────────────────

  /// File a new complaint. Student-only; the identifier is minted
  /// atomically by the store and the trail starts with a `Created` entry.
  pub async fn create(
    &self,
    actor: &Actor,
    input: NewComplaintInput,
  ) -> Result<Complaint> {
    policy::authorize(actor.role, Relationship::Unrelated, ComplaintAction::Create)?;

    let title = input.title.trim();
    if title.is_empty() {
      return Err(Error::Validation {
        field:  "title",
        reason: "must not be empty".to_string(),
      });
    }
    if title.chars().count() > MAX_TITLE_CHARS {
      return Err(Error::Validation {
        field:  "title",
        reason: format!("must be at most {MAX_TITLE_CHARS} characters"),
      });
    }
    if input.description.trim().is_empty() {
      return Err(Error::Validation {
        field:  "description",
        reason: "must not be empty".to_string(),
      });
    }

    self
      .store
      .category(input.category_id)
      .await
      .map_store()?
      .ok_or(Error::CategoryNotFound(input.category_id))?;

    if let Some(attachment) = &input.attachment {
      attachment.validate()?;
    }

    let complaint = self
      .store
      .create_complaint(NewComplaint {
        title:       title.to_string(),
        description: input.description,
        category_id: input.category_id,
        priority:    input.priority,
        created_by:  actor.actor_id,
        attachment:  input.attachment,
      })
      .await
      .map_store()?;

    for admin in self.store.list_actors(Some(Role::Admin)).await.map_store()? {
      self
        .store
        .add_notification(
          admin.actor_id,
          format!(
            "New complaint {} filed by {}",
            complaint.complaint_no, actor.display_name
          ),
        )
        .await
        .map_store()?;
    }

    Ok(complaint)
  }

  // ── Assign ────────────────────────────────────────────────────────────

  /// Assign a complaint to a faculty member. Admin-only; moves Pending →
  /// InProgress, leaves any other (non-Closed) status in place.
  pub async fn assign(
    &self,
    actor: &Actor,
    no: ComplaintNo,
    assignee_id: Uuid,
    remark: Option<String>,
  ) -> Result<Complaint> {
    policy::authorize(actor.role, Relationship::Unrelated, ComplaintAction::Assign)?;

    let complaint = self
      .store
      .complaint(no)
      .await
      .map_store()?
      .ok_or(Error::ComplaintNotFound(no))?;

    let assignee = self
      .store
      .actor(assignee_id)
      .await
      .map_store()?
      .ok_or(Error::ActorNotFound(assignee_id))?;
    if assignee.role != Role::Faculty {
      return Err(Error::Validation {
        field:  "assignee",
        reason: format!("{} is not a faculty member", assignee.username),
      });
    }

    if complaint.status == Status::Closed {
      return Err(Error::State {
        current: Status::Closed,
        reason:  "closed complaints cannot be reassigned".to_string(),
      });
    }

    let new_status = if complaint.status == Status::Pending {
      Status::InProgress
    } else {
      complaint.status
    };

    let updated = self
      .store
      .assign_complaint(AssignmentInput {
        complaint_no: no,
        actor_id: actor.actor_id,
        assignee_id,
        expected_status: complaint.status,
        new_status,
        remark,
      })
      .await
      .map_store()?;

    self
      .store
      .add_notification(assignee.actor_id, format!("Complaint {no} assigned to you"))
      .await
      .map_store()?;
    self
      .store
      .add_notification(
        updated.created_by,
        format!("Complaint {no} assigned to faculty"),
      )
      .await
      .map_store()?;

    Ok(updated)
  }

  // ── Status updates ────────────────────────────────────────────────────

  /// Move a complaint one step along the workflow. Authorization is
  /// evaluated against the target status; the transition itself is
  /// re-validated inside the store's transaction (optimistic concurrency).
  pub async fn update_status(
    &self,
    actor: &Actor,
    no: ComplaintNo,
    input: StatusUpdateInput,
  ) -> Result<Complaint> {
    let complaint = self
      .store
      .complaint(no)
      .await
      .map_store()?
      .ok_or(Error::ComplaintNotFound(no))?;

    let relationship = policy::relationship(actor, &complaint);
    policy::authorize(
      actor.role,
      relationship,
      ComplaintAction::SetStatus(input.new_status),
    )?;

    if input.new_status == Status::Resolved
      && input.remark.as_deref().map(str::trim).unwrap_or("").is_empty()
    {
      return Err(Error::Validation {
        field:  "remark",
        reason: "resolving requires a remark".to_string(),
      });
    }

    // Conflict against the caller's own read, when it supplied one.
    if let Some(observed) = input.observed_status
      && observed != complaint.status
    {
      return Err(Error::Conflict(format!(
        "complaint {no} is {} now, not {observed}",
        complaint.status
      )));
    }

    lifecycle::validate_transition(complaint.status, input.new_status)?;

    let updated = self
      .store
      .transition_complaint(TransitionInput {
        complaint_no: no,
        actor_id: actor.actor_id,
        expected_status: complaint.status,
        new_status: input.new_status,
        kind: HistoryKind::StatusChanged,
        remark: input.remark,
      })
      .await
      .map_store()?;

    self
      .store
      .add_notification(
        updated.created_by,
        format!("Complaint {no} status updated to {}", updated.status),
      )
      .await
      .map_store()?;

    Ok(updated)
  }

  /// The one sanctioned backward move: Resolved/Closed → InProgress,
  /// admin-only, gated by configuration, logged as its own history kind.
  pub async fn reopen(
    &self,
    actor: &Actor,
    no: ComplaintNo,
    remark: Option<String>,
  ) -> Result<Complaint> {
    let complaint = self
      .store
      .complaint(no)
      .await
      .map_store()?
      .ok_or(Error::ComplaintNotFound(no))?;

    let relationship = policy::relationship(actor, &complaint);
    policy::authorize(actor.role, relationship, ComplaintAction::Reopen)?;

    if !self.config.allow_reopen {
      return Err(Error::State {
        current: complaint.status,
        reason:  "reopening is disabled".to_string(),
      });
    }
    lifecycle::validate_reopen(complaint.status)?;

    let updated = self
      .store
      .transition_complaint(TransitionInput {
        complaint_no: no,
        actor_id: actor.actor_id,
        expected_status: complaint.status,
        new_status: lifecycle::REOPEN_TARGET,
        kind: HistoryKind::Reopened,
        remark,
      })
      .await
      .map_store()?;

    self
      .store
      .add_notification(updated.created_by, format!("Complaint {no} was reopened"))
      .await
      .map_store()?;

    Ok(updated)
  }

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Record the creator's feedback once work has concluded. The
  /// at-most-one rule is enforced by the store; a second call conflicts.
  pub async fn add_feedback(
    &self,
    actor: &Actor,
    no: ComplaintNo,
    rating: u8,
    comment: Option<String>,
  ) -> Result<Feedback> {
    let complaint = self
      .store
      .complaint(no)
      .await
      .map_store()?
      .ok_or(Error::ComplaintNotFound(no))?;

    let relationship = policy::relationship(actor, &complaint);
    policy::authorize(actor.role, relationship, ComplaintAction::AddFeedback)?;

    if !(1..=5).contains(&rating) {
      return Err(Error::Validation {
        field:  "rating",
        reason: format!("must be between 1 and 5, got {rating}"),
      });
    }
    if !matches!(complaint.status, Status::Resolved | Status::Closed) {
      return Err(Error::State {
        current: complaint.status,
        reason:  "feedback is only accepted once resolved".to_string(),
      });
    }

    self
      .store
      .add_feedback(NewFeedback {
        complaint_no: no,
        actor_id: actor.actor_id,
        rating,
        comment,
      })
      .await
      .map_store()
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch one complaint. Complaints outside the actor's visibility read
  /// as missing, never as forbidden.
  pub async fn complaint(&self, actor: &Actor, no: ComplaintNo) -> Result<Complaint> {
    let complaint = self
      .store
      .complaint(no)
      .await
      .map_store()?
      .ok_or(Error::ComplaintNotFound(no))?;

    if !policy::can_view(actor, &complaint) {
      return Err(Error::ComplaintNotFound(no));
    }
    Ok(complaint)
  }

  /// List complaints, with the caller's filters narrowed to what the actor
  /// may see.
  pub async fn list(
    &self,
    actor: &Actor,
    query: ComplaintQuery,
  ) -> Result<Vec<Complaint>> {
    let scoped = scope_query(actor, query);
    self.store.list_complaints(&scoped).await.map_store()
  }

  /// The chronological audit trail, visibility-gated like the complaint.
  pub async fn history(
    &self,
    actor: &Actor,
    no: ComplaintNo,
  ) -> Result<Vec<HistoryEntry>> {
    self.complaint(actor, no).await?;
    self.store.history(no).await.map_store()
  }

  pub async fn feedback_for(
    &self,
    actor: &Actor,
    no: ComplaintNo,
  ) -> Result<Option<Feedback>> {
    self.complaint(actor, no).await?;
    self.store.feedback(no).await.map_store()
  }

  /// Dashboard counts over the actor's visible slice.
  pub async fn stats(&self, actor: &Actor) -> Result<ComplaintStats> {
    let scoped = scope_query(actor, ComplaintQuery::default());
    self.store.complaint_stats(&scoped).await.map_store()
  }

  // ── Categories ────────────────────────────────────────────────────────

  pub async fn categories(&self) -> Result<Vec<Category>> {
    self.store.list_categories().await.map_store()
  }

  pub async fn add_category(
    &self,
    actor: &Actor,
    input: NewCategory,
  ) -> Result<Category> {
    policy::authorize(actor.role, Relationship::Unrelated, ComplaintAction::AddCategory)?;

    let name = input.name.trim().to_string();
    if name.is_empty() {
      return Err(Error::Validation {
        field:  "name",
        reason: "must not be empty".to_string(),
      });
    }
    if let Some(parent_id) = input.parent_id {
      self
        .store
        .category(parent_id)
        .await
        .map_store()?
        .ok_or(Error::CategoryNotFound(parent_id))?;
    }

    self
      .store
      .add_category(NewCategory { name, ..input })
      .await
      .map_store()
  }

  // ── Notifications ─────────────────────────────────────────────────────

  pub async fn notifications(
    &self,
    actor: &Actor,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    self
      .store
      .list_notifications(actor.actor_id, unread_only)
      .await
      .map_store()
  }

  /// Mark one of the actor's own notifications as read. Foreign
  /// notifications read as missing.
  pub async fn mark_notification_read(
    &self,
    actor: &Actor,
    id: Uuid,
  ) -> Result<Notification> {
    let notification = self
      .store
      .notification(id)
      .await
      .map_store()?
      .ok_or(Error::NotificationNotFound(id))?;
    if notification.actor_id != actor.actor_id {
      return Err(Error::NotificationNotFound(id));
    }
    self.store.mark_notification_read(id).await.map_store()
  }

  // ── Export ────────────────────────────────────────────────────────────

  /// Admin-only complete snapshot of complaints matching `query`, with
  /// identifiers resolved to display names.
  pub async fn export_rows(
    &self,
    actor: &Actor,
    query: &ComplaintQuery,
  ) -> Result<Vec<ExportRow>> {
    policy::authorize(actor.role, Relationship::Unrelated, ComplaintAction::Export)?;

    let complaints = self.store.list_complaints(query).await.map_store()?;
    let actors = self.actor_names().await?;
    let categories: HashMap<Uuid, String> = self
      .store
      .list_categories()
      .await
      .map_store()?
      .into_iter()
      .map(|c| (c.category_id, c.name))
      .collect();

    Ok(
      complaints
        .iter()
        .map(|c| ExportRow {
          complaint_no: c.complaint_no.to_string(),
          title:        c.title.clone(),
          status:       c.status.as_str().to_string(),
          priority:     c.priority.as_str().to_string(),
          created_by:   actors.get(&c.created_by).cloned().unwrap_or_default(),
          assigned_to:  c
            .assigned_to
            .and_then(|id| actors.get(&id).cloned())
            .unwrap_or_default(),
          category:     categories
            .get(&c.category_id)
            .cloned()
            .unwrap_or_default(),
          created_at:   c.created_at.to_rfc3339(),
          resolved_at:  c
            .resolved_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        })
        .collect(),
    )
  }

  /// Admin-only history section for an export: every audit entry of every
  /// complaint matching `query`, flattened.
  pub async fn export_history_rows(
    &self,
    actor: &Actor,
    query: &ComplaintQuery,
  ) -> Result<Vec<HistoryExportRow>> {
    policy::authorize(actor.role, Relationship::Unrelated, ComplaintAction::Export)?;

    let complaints = self.store.list_complaints(query).await.map_store()?;
    let actors = self.actor_names().await?;

    let mut rows = Vec::new();
    for complaint in &complaints {
      for entry in self.store.history(complaint.complaint_no).await.map_store()? {
        rows.push(HistoryExportRow {
          complaint_no: entry.complaint_no.to_string(),
          kind:         entry.kind.as_str().to_string(),
          actor:        actors.get(&entry.actor_id).cloned().unwrap_or_default(),
          from_status:  entry
            .from_status
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
          to_status:    entry.to_status.as_str().to_string(),
          remark:       entry.remark.clone().unwrap_or_default(),
          recorded_at:  entry.recorded_at.to_rfc3339(),
        });
      }
    }
    Ok(rows)
  }

  async fn actor_names(&self) -> Result<HashMap<Uuid, String>> {
    Ok(
      self
        .store
        .list_actors(None)
        .await
        .map_store()?
        .into_iter()
        .map(|a| (a.actor_id, a.display_name))
        .collect(),
    )
  }
}

/// Narrow a caller-supplied query to what the actor may see: faculty their
/// assignments, students their own filings, admins everything.
fn scope_query(actor: &Actor, mut query: ComplaintQuery) -> ComplaintQuery {
  match actor.role {
    Role::Admin => {}
    Role::Faculty => query.assigned_to = Some(actor.actor_id),
    Role::Student => query.created_by = Some(actor.actor_id),
  }
  query
}
