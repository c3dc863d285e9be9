//! [`SqliteStore`] — the SQLite implementation of [`ComplaintStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use uuid::Uuid;

use redress_core::{
  actor::{Actor, NewActor, Role},
  category::{Category, NewCategory},
  complaint::{Complaint, ComplaintNo, MAX_DAILY_SEQUENCE, Status},
  feedback::{Feedback, NewFeedback},
  history::{HistoryEntry, HistoryKind},
  notification::Notification,
  store::{
    AssignmentInput, CategoryCount, ComplaintQuery, ComplaintStats,
    ComplaintStore, NewComplaint, TransitionInput,
  },
};

use crate::{
  Error, Result,
  encode::{
    COMPLAINT_COLUMNS, RawActor, RawCategory, RawComplaint, RawFeedback,
    RawHistoryEntry, RawNotification, decode_status, decode_uuid,
    encode_complaint_no, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Redress store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialized onto the connection's worker thread, so transactions
/// never interleave; the expected-status guards below exist for callers
/// that read, think, then write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of a guarded complaint transaction, before error mapping.
enum TxOutcome {
  Applied(RawComplaint),
  Missing,
  StatusChanged { current: String },
}

/// Outcome of the guarded feedback transaction.
enum FeedbackOutcome {
  Applied,
  Missing,
  WrongState { current: String },
  Duplicate,
}

/// Outcome of a uniqueness-guarded insert.
enum InsertOutcome {
  Inserted,
  Duplicate,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query plumbing ──────────────────────────────────────────────────────────

/// Build the WHERE clause for a [`ComplaintQuery`]. Parameter numbers are
/// fixed; every caller binds all eight slots (LIMIT/OFFSET are ?7/?8) so
/// the statement's parameter count never depends on which filters are set.
fn complaint_where(query: &ComplaintQuery) -> String {
  let mut conds: Vec<&'static str> = vec![];
  if query.status.is_some() {
    conds.push("c.status = ?1");
  }
  if query.priority.is_some() {
    conds.push("c.priority = ?2");
  }
  if query.category_id.is_some() {
    conds.push("c.category_id = ?3");
  }
  if query.assigned_to.is_some() {
    conds.push("c.assigned_to = ?4");
  }
  if query.created_by.is_some() {
    conds.push("c.created_by = ?5");
  }
  if query.text.is_some() {
    conds.push(
      "(c.title LIKE ?6 OR c.description LIKE ?6 OR c.complaint_no LIKE ?6)",
    );
  }

  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

/// The owned bind values matching [`complaint_where`]'s slots ?1..?6.
struct QueryBinds {
  status:   Option<String>,
  priority: Option<String>,
  category: Option<String>,
  assignee: Option<String>,
  creator:  Option<String>,
  text:     Option<String>,
}

impl QueryBinds {
  fn new(query: &ComplaintQuery) -> Self {
    Self {
      status:   query.status.map(|s| s.as_str().to_string()),
      priority: query.priority.map(|p| p.as_str().to_string()),
      category: query.category_id.map(encode_uuid),
      assignee: query.assigned_to.map(encode_uuid),
      creator:  query.created_by.map(encode_uuid),
      text:     query.text.as_deref().map(|t| format!("%{t}%")),
    }
  }
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  // ── Actors ──────────────────────────────────────────────────────────────

  async fn add_actor(&self, input: NewActor) -> Result<Actor> {
    let actor = Actor {
      actor_id:     Uuid::new_v4(),
      username:     input.username,
      display_name: input.display_name,
      role:         input.role,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(actor.actor_id);
    let username     = actor.username.clone();
    let display_name = actor.display_name.clone();
    let role_str     = actor.role.as_str().to_string();
    let hash         = input.password_hash;
    let at_str       = encode_dt(actor.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM actors WHERE username = ?1",
            params![username],
            |r| r.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(InsertOutcome::Duplicate);
        }

        tx.execute(
          "INSERT INTO actors
             (actor_id, username, display_name, role, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, username, display_name, role_str, hash, at_str],
        )?;

        tx.commit()?;
        Ok(InsertOutcome::Inserted)
      })
      .await?;

    match outcome {
      InsertOutcome::Inserted => Ok(actor),
      InsertOutcome::Duplicate => Err(Error::DuplicateUsername(actor.username)),
    }
  }

  async fn actor(&self, id: Uuid) -> Result<Option<Actor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawActor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT actor_id, username, display_name, role, created_at
               FROM actors WHERE actor_id = ?1",
              params![id_str],
              RawActor::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawActor::into_actor).transpose()
  }

  async fn actor_by_username(&self, username: &str) -> Result<Option<Actor>> {
    let username = username.to_string();

    let raw: Option<RawActor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT actor_id, username, display_name, role, created_at
               FROM actors WHERE username = ?1",
              params![username],
              RawActor::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawActor::into_actor).transpose()
  }

  async fn password_hash(&self, username: &str) -> Result<Option<String>> {
    let username = username.to_string();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT password_hash FROM actors WHERE username = ?1",
                params![username],
                |r| r.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_actors(&self, role: Option<Role>) -> Result<Vec<Actor>> {
    let role_str = role.map(|r| r.as_str().to_string());

    let raws: Vec<RawActor> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(role) = role_str {
          let mut stmt = conn.prepare(
            "SELECT actor_id, username, display_name, role, created_at
             FROM actors WHERE role = ?1 ORDER BY username",
          )?;
          stmt
            .query_map(params![role], RawActor::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT actor_id, username, display_name, role, created_at
             FROM actors ORDER BY username",
          )?;
          stmt
            .query_map([], RawActor::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActor::into_actor).collect()
  }

  // ── Categories ──────────────────────────────────────────────────────────

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    let category = Category {
      category_id: Uuid::new_v4(),
      name:        input.name,
      parent_id:   input.parent_id,
      description: input.description,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(category.category_id);
    let name        = category.name.clone();
    let parent_str  = category.parent_id.map(encode_uuid);
    let description = category.description.clone();
    let at_str      = encode_dt(category.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM categories WHERE name = ?1",
            params![name],
            |r| r.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(InsertOutcome::Duplicate);
        }

        tx.execute(
          "INSERT INTO categories
             (category_id, name, parent_id, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, name, parent_str, description, at_str],
        )?;

        tx.commit()?;
        Ok(InsertOutcome::Inserted)
      })
      .await?;

    match outcome {
      InsertOutcome::Inserted => Ok(category),
      InsertOutcome::Duplicate => Err(Error::DuplicateCategory(category.name)),
    }
  }

  async fn category(&self, id: Uuid) -> Result<Option<Category>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCategory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT category_id, name, parent_id, description, created_at
               FROM categories WHERE category_id = ?1",
              params![id_str],
              RawCategory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCategory::into_category).transpose()
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let raws: Vec<RawCategory> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT category_id, name, parent_id, description, created_at
           FROM categories ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], RawCategory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  // ── Complaints ──────────────────────────────────────────────────────────

  async fn create_complaint(&self, input: NewComplaint) -> Result<Complaint> {
    let now   = Utc::now();
    let today = now.date_naive();

    let date_key       = today.format("%Y%m%d").to_string();
    let title          = input.title.clone();
    let description    = input.description.clone();
    let category_str   = encode_uuid(input.category_id);
    let priority_str   = input.priority.as_str().to_string();
    let creator_str    = encode_uuid(input.created_by);
    let att_path       = input.attachment.as_ref().map(|a| a.path.clone());
    let att_size       = input.attachment.as_ref().map(|a| a.size_bytes as i64);
    let att_media      = input.attachment.as_ref().map(|a| a.media_type.clone());
    let now_str        = encode_dt(now);
    let history_id_str = encode_uuid(Uuid::new_v4());
    let max_seq        = i64::from(MAX_DAILY_SEQUENCE);

    let sequence: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Allocate the next per-date sequence inside this transaction;
        // bailing out before commit rolls the allocation back.
        tx.execute(
          "INSERT INTO complaint_sequences (seq_date, next_seq)
           VALUES (?1, 1)
           ON CONFLICT (seq_date) DO UPDATE SET next_seq = next_seq + 1",
          params![date_key],
        )?;
        let seq: i64 = tx.query_row(
          "SELECT next_seq FROM complaint_sequences WHERE seq_date = ?1",
          params![date_key],
          |r| r.get(0),
        )?;
        if seq > max_seq {
          return Ok(None);
        }

        let no_str = format!("CMP-{date_key}-{seq:06}");

        tx.execute(
          "INSERT INTO complaints (
             complaint_no, title, description, category_id, priority, status,
             created_by, assigned_to,
             attachment_path, attachment_size, attachment_media_type,
             created_at, updated_at, resolved_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          params![
            no_str,
            title,
            description,
            category_str,
            priority_str,
            "pending",
            creator_str,
            None::<String>,
            att_path,
            att_size,
            att_media,
            now_str,
            now_str,
            None::<String>,
          ],
        )?;

        tx.execute(
          "INSERT INTO complaint_history (
             history_id, complaint_no, actor_id, kind,
             from_status, to_status, remark, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            history_id_str,
            no_str,
            creator_str,
            "created",
            None::<String>,
            "pending",
            None::<String>,
            now_str,
          ],
        )?;

        tx.commit()?;
        Ok(Some(seq))
      })
      .await?;

    let sequence = sequence.ok_or(Error::SequenceExhausted(today))?;
    let complaint_no =
      ComplaintNo::new(today, sequence as u32).map_err(Error::Core)?;

    Ok(Complaint {
      complaint_no,
      title: input.title,
      description: input.description,
      category_id: input.category_id,
      priority: input.priority,
      status: Status::Pending,
      created_by: input.created_by,
      assigned_to: None,
      attachment: input.attachment,
      created_at: now,
      updated_at: now,
      resolved_at: None,
    })
  }

  async fn complaint(&self, no: ComplaintNo) -> Result<Option<Complaint>> {
    let no_str = encode_complaint_no(no);

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints c
                 WHERE c.complaint_no = ?1"
              ),
              params![no_str],
              RawComplaint::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn list_complaints(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    let where_clause = complaint_where(query);
    let binds        = QueryBinds::new(query);
    let limit        = query.limit.unwrap_or(100) as i64;
    let offset       = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {COMPLAINT_COLUMNS} FROM complaints c
           {where_clause}
           ORDER BY c.created_at DESC, c.complaint_no DESC
           LIMIT ?7 OFFSET ?8"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            params![
              binds.status,
              binds.priority,
              binds.category,
              binds.assignee,
              binds.creator,
              binds.text,
              limit,
              offset,
            ],
            RawComplaint::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn assign_complaint(&self, input: AssignmentInput) -> Result<Complaint> {
    let no_str         = encode_complaint_no(input.complaint_no);
    let expected_str   = input.expected_status.as_str().to_string();
    let new_status_str = input.new_status.as_str().to_string();
    let assignee_str   = encode_uuid(input.assignee_id);
    let actor_str      = encode_uuid(input.actor_id);
    let remark         = input.remark.clone();
    let now_str        = encode_dt(Utc::now());
    let history_id_str = encode_uuid(Uuid::new_v4());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM complaints WHERE complaint_no = ?1",
            params![no_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(TxOutcome::Missing);
        };
        if current != expected_str {
          return Ok(TxOutcome::StatusChanged { current });
        }

        tx.execute(
          "UPDATE complaints
           SET assigned_to = ?2, status = ?3, updated_at = ?4
           WHERE complaint_no = ?1",
          params![no_str, assignee_str, new_status_str, now_str],
        )?;

        tx.execute(
          "INSERT INTO complaint_history (
             history_id, complaint_no, actor_id, kind,
             from_status, to_status, remark, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            history_id_str,
            no_str,
            actor_str,
            "assigned",
            expected_str,
            new_status_str,
            remark,
            now_str,
          ],
        )?;

        let raw = tx.query_row(
          &format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints c
             WHERE c.complaint_no = ?1"
          ),
          params![no_str],
          RawComplaint::from_row,
        )?;

        tx.commit()?;
        Ok(TxOutcome::Applied(raw))
      })
      .await?;

    match outcome {
      TxOutcome::Applied(raw) => raw.into_complaint(),
      TxOutcome::Missing => Err(Error::ComplaintNotFound(input.complaint_no)),
      TxOutcome::StatusChanged { current } => Err(Error::StatusChanged {
        complaint_no: input.complaint_no,
        expected:     input.expected_status,
        current:      decode_status(&current)?,
      }),
    }
  }

  async fn transition_complaint(&self, input: TransitionInput) -> Result<Complaint> {
    let no_str         = encode_complaint_no(input.complaint_no);
    let expected_str   = input.expected_status.as_str().to_string();
    let new_status_str = input.new_status.as_str().to_string();
    let actor_str      = encode_uuid(input.actor_id);
    let kind_str       = input.kind.as_str().to_string();
    let remark         = input.remark.clone();
    let now_str        = encode_dt(Utc::now());
    let history_id_str = encode_uuid(Uuid::new_v4());
    let entering_resolved = input.new_status == Status::Resolved;
    let reopening         = input.kind == HistoryKind::Reopened;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM complaints WHERE complaint_no = ?1",
            params![no_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(TxOutcome::Missing);
        };
        if current != expected_str {
          return Ok(TxOutcome::StatusChanged { current });
        }

        if reopening {
          tx.execute(
            "UPDATE complaints
             SET status = ?2, updated_at = ?3, resolved_at = NULL
             WHERE complaint_no = ?1",
            params![no_str, new_status_str, now_str],
          )?;
        } else if entering_resolved {
          tx.execute(
            "UPDATE complaints
             SET status = ?2, updated_at = ?3,
                 resolved_at = COALESCE(resolved_at, ?3)
             WHERE complaint_no = ?1",
            params![no_str, new_status_str, now_str],
          )?;
        } else {
          tx.execute(
            "UPDATE complaints
             SET status = ?2, updated_at = ?3
             WHERE complaint_no = ?1",
            params![no_str, new_status_str, now_str],
          )?;
        }

        tx.execute(
          "INSERT INTO complaint_history (
             history_id, complaint_no, actor_id, kind,
             from_status, to_status, remark, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            history_id_str,
            no_str,
            actor_str,
            kind_str,
            expected_str,
            new_status_str,
            remark,
            now_str,
          ],
        )?;

        let raw = tx.query_row(
          &format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints c
             WHERE c.complaint_no = ?1"
          ),
          params![no_str],
          RawComplaint::from_row,
        )?;

        tx.commit()?;
        Ok(TxOutcome::Applied(raw))
      })
      .await?;

    match outcome {
      TxOutcome::Applied(raw) => raw.into_complaint(),
      TxOutcome::Missing => Err(Error::ComplaintNotFound(input.complaint_no)),
      TxOutcome::StatusChanged { current } => Err(Error::StatusChanged {
        complaint_no: input.complaint_no,
        expected:     input.expected_status,
        current:      decode_status(&current)?,
      }),
    }
  }

  // ── Feedback ────────────────────────────────────────────────────────────

  async fn add_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    let feedback = Feedback {
      feedback_id:  Uuid::new_v4(),
      complaint_no: input.complaint_no,
      actor_id:     input.actor_id,
      rating:       input.rating,
      comment:      input.comment,
      created_at:   Utc::now(),
    };

    let id_str    = encode_uuid(feedback.feedback_id);
    let no_str    = encode_complaint_no(feedback.complaint_no);
    let actor_str = encode_uuid(feedback.actor_id);
    let rating    = i64::from(feedback.rating);
    let comment   = feedback.comment.clone();
    let at_str    = encode_dt(feedback.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Re-check the feedback window inside the transaction.
        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM complaints WHERE complaint_no = ?1",
            params![no_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(status) = status else {
          return Ok(FeedbackOutcome::Missing);
        };
        if status != "resolved" && status != "closed" {
          return Ok(FeedbackOutcome::WrongState { current: status });
        }

        let exists: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM feedback WHERE complaint_no = ?1",
            params![no_str],
            |r| r.get(0),
          )
          .optional()?;
        if exists.is_some() {
          return Ok(FeedbackOutcome::Duplicate);
        }

        tx.execute(
          "INSERT INTO feedback
             (feedback_id, complaint_no, actor_id, rating, comment, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, no_str, actor_str, rating, comment, at_str],
        )?;

        tx.commit()?;
        Ok(FeedbackOutcome::Applied)
      })
      .await?;

    match outcome {
      FeedbackOutcome::Applied => Ok(feedback),
      FeedbackOutcome::Missing => {
        Err(Error::ComplaintNotFound(feedback.complaint_no))
      }
      FeedbackOutcome::WrongState { current } => {
        Err(Error::FeedbackState(decode_status(&current)?))
      }
      FeedbackOutcome::Duplicate => {
        Err(Error::DuplicateFeedback(feedback.complaint_no))
      }
    }
  }

  async fn feedback(&self, no: ComplaintNo) -> Result<Option<Feedback>> {
    let no_str = encode_complaint_no(no);

    let raw: Option<RawFeedback> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT feedback_id, complaint_no, actor_id, rating, comment, created_at
               FROM feedback WHERE complaint_no = ?1",
              params![no_str],
              RawFeedback::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFeedback::into_feedback).transpose()
  }

  // ── History ─────────────────────────────────────────────────────────────

  async fn history(&self, no: ComplaintNo) -> Result<Vec<HistoryEntry>> {
    let no_str = encode_complaint_no(no);

    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT history_id, complaint_no, actor_id, kind,
                  from_status, to_status, remark, recorded_at
           FROM complaint_history
           WHERE complaint_no = ?1
           ORDER BY recorded_at ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(params![no_str], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }

  // ── Notifications ───────────────────────────────────────────────────────

  async fn add_notification(
    &self,
    actor_id: Uuid,
    message: String,
  ) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      actor_id,
      message,
      is_read: false,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(notification.notification_id);
    let actor_str = encode_uuid(actor_id);
    let message   = notification.message.clone();
    let at_str    = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications
             (notification_id, actor_id, message, is_read, created_at)
           VALUES (?1, ?2, ?3, 0, ?4)",
          params![id_str, actor_str, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn notification(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT notification_id, actor_id, message, is_read, created_at
               FROM notifications WHERE notification_id = ?1",
              params![id_str],
              RawNotification::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_notifications(
    &self,
    actor_id: Uuid,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    let actor_str = encode_uuid(actor_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let sql = if unread_only {
          "SELECT notification_id, actor_id, message, is_read, created_at
           FROM notifications
           WHERE actor_id = ?1 AND is_read = 0
           ORDER BY created_at DESC, rowid DESC"
        } else {
          "SELECT notification_id, actor_id, message, is_read, created_at
           FROM notifications
           WHERE actor_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(params![actor_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
          params![id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT notification_id, actor_id, message, is_read, created_at
               FROM notifications WHERE notification_id = ?1",
              params![id_str],
              RawNotification::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::NotificationNotFound(id))?
      .into_notification()
  }

  // ── Stats ───────────────────────────────────────────────────────────────

  async fn complaint_stats(&self, scope: &ComplaintQuery) -> Result<ComplaintStats> {
    let where_clause = complaint_where(scope);
    let binds        = QueryBinds::new(scope);
    // Counts always cover the whole scope; LIMIT -1 binds the shared ?7/?8
    // slots without constraining anything.
    let limit: i64  = -1;
    let offset: i64 = 0;

    type StatusRows   = Vec<(String, i64)>;
    type PriorityRows = Vec<(String, i64)>;
    type CategoryRows = Vec<(String, String, i64)>;

    let (by_status, by_priority, by_category, avg_secs): (
      StatusRows,
      PriorityRows,
      CategoryRows,
      Option<f64>,
    ) = self
      .conn
      .call(move |conn| {
        let all_params = params![
          binds.status,
          binds.priority,
          binds.category,
          binds.assignee,
          binds.creator,
          binds.text,
          limit,
          offset,
        ];

        let mut stmt = conn.prepare(&format!(
          "SELECT c.status, COUNT(*) FROM complaints c
           {where_clause} GROUP BY c.status LIMIT ?7 OFFSET ?8"
        ))?;
        let by_status = stmt
          .query_map(all_params, |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT c.priority, COUNT(*) FROM complaints c
           {where_clause} GROUP BY c.priority LIMIT ?7 OFFSET ?8"
        ))?;
        let by_priority = stmt
          .query_map(all_params, |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT c.category_id, cat.name, COUNT(*)
           FROM complaints c
           JOIN categories cat ON cat.category_id = c.category_id
           {where_clause}
           GROUP BY c.category_id, cat.name
           ORDER BY cat.name LIMIT ?7 OFFSET ?8"
        ))?;
        let by_category = stmt
          .query_map(all_params, |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let resolved_where = if where_clause.is_empty() {
          "WHERE c.resolved_at IS NOT NULL".to_string()
        } else {
          format!("{where_clause} AND c.resolved_at IS NOT NULL")
        };
        let avg_secs: Option<f64> = conn.query_row(
          &format!(
            "SELECT AVG((julianday(c.resolved_at) - julianday(c.created_at))
                        * 86400.0)
             FROM complaints c {resolved_where} LIMIT ?7 OFFSET ?8"
          ),
          all_params,
          |r| r.get(0),
        )?;

        Ok((by_status, by_priority, by_category, avg_secs))
      })
      .await?;

    let mut stats = ComplaintStats {
      total:               0,
      pending:             0,
      in_progress:         0,
      resolved:            0,
      closed:              0,
      high_priority:       0,
      by_category:         Vec::new(),
      avg_resolution_secs: avg_secs.map(|s| s as i64),
    };

    for (status, count) in by_status {
      let count = count as u64;
      stats.total += count;
      match decode_status(&status)? {
        Status::Pending => stats.pending = count,
        Status::InProgress => stats.in_progress = count,
        Status::Resolved => stats.resolved = count,
        Status::Closed => stats.closed = count,
      }
    }

    for (priority, count) in by_priority {
      if priority == "high" {
        stats.high_priority = count as u64;
      }
    }

    for (category_id, name, count) in by_category {
      stats.by_category.push(CategoryCount {
        category_id: decode_uuid(&category_id)?,
        name,
        count: count as u64,
      });
    }

    Ok(stats)
  }
}
