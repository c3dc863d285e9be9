//! The authorization table.
//!
//! Every mutating operation resolves `(role, relationship, action)` against
//! this table before any state-machine rule runs, so "not allowed for your
//! role" and "not allowed in this state" stay distinct failures.

use crate::{
  Error, Result,
  actor::{Actor, Role},
  complaint::{Complaint, Status},
};

/// How an actor relates to a specific complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
  Creator,
  Assignee,
  Unrelated,
}

/// The operations governed by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintAction {
  Create,
  Assign,
  SetStatus(Status),
  Reopen,
  AddFeedback,
  AddCategory,
  Export,
}

impl ComplaintAction {
  /// Human-readable name used in permission errors.
  fn describe(self) -> String {
    match self {
      Self::Create => "create complaints".to_string(),
      Self::Assign => "assign complaints".to_string(),
      Self::SetStatus(to) => format!("set status to {to}"),
      Self::Reopen => "reopen complaints".to_string(),
      Self::AddFeedback => "leave feedback on this complaint".to_string(),
      Self::AddCategory => "manage categories".to_string(),
      Self::Export => "export complaints".to_string(),
    }
  }
}

/// Resolve `actor`'s relationship to `complaint`.
pub fn relationship(actor: &Actor, complaint: &Complaint) -> Relationship {
  if complaint.created_by == actor.actor_id {
    Relationship::Creator
  } else if complaint.assigned_to == Some(actor.actor_id) {
    Relationship::Assignee
  } else {
    Relationship::Unrelated
  }
}

/// Read visibility: admins see everything, faculty their assignments,
/// students their own filings. An invisible complaint reads as missing,
/// never as forbidden.
pub fn can_view(actor: &Actor, complaint: &Complaint) -> bool {
  match actor.role {
    Role::Admin => true,
    Role::Faculty => complaint.assigned_to == Some(actor.actor_id),
    Role::Student => complaint.created_by == actor.actor_id,
  }
}

/// The table itself. Anything not explicitly allowed is denied.
pub fn authorize(
  role: Role,
  relationship: Relationship,
  action: ComplaintAction,
) -> Result<()> {
  use ComplaintAction as A;
  use Relationship as R;
  use Role::*;

  let allowed = match (role, relationship, action) {
    (Student, _, A::Create) => true,
    (Admin, _, A::Assign) => true,
    // Nobody returns a complaint to Pending; that is not a transition.
    (_, _, A::SetStatus(Status::Pending)) => false,
    (Admin, _, A::SetStatus(Status::InProgress | Status::Resolved)) => true,
    (Faculty, R::Assignee, A::SetStatus(Status::InProgress | Status::Resolved)) => {
      true
    }
    // Closing is the admin's call alone.
    (Admin, _, A::SetStatus(Status::Closed)) => true,
    (Admin, _, A::Reopen) => true,
    (_, R::Creator, A::AddFeedback) => true,
    (Admin, _, A::AddCategory | A::Export) => true,
    _ => false,
  };

  if allowed {
    Ok(())
  } else {
    Err(Error::Permission { role, action: action.describe() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use ComplaintAction as A;
  use Relationship as R;

  fn denied(role: Role, rel: Relationship, action: ComplaintAction) -> bool {
    matches!(authorize(role, rel, action), Err(Error::Permission { .. }))
  }

  #[test]
  fn only_students_create() {
    assert!(authorize(Role::Student, R::Unrelated, A::Create).is_ok());
    assert!(denied(Role::Faculty, R::Unrelated, A::Create));
    assert!(denied(Role::Admin, R::Unrelated, A::Create));
  }

  #[test]
  fn only_admins_assign() {
    assert!(authorize(Role::Admin, R::Unrelated, A::Assign).is_ok());
    assert!(denied(Role::Faculty, R::Assignee, A::Assign));
    assert!(denied(Role::Student, R::Creator, A::Assign));
  }

  #[test]
  fn faculty_never_closes() {
    // Regardless of relationship, Closed is out of reach for faculty.
    for rel in [R::Creator, R::Assignee, R::Unrelated] {
      assert!(denied(Role::Faculty, rel, A::SetStatus(Status::Closed)));
    }
    assert!(
      authorize(Role::Admin, R::Unrelated, A::SetStatus(Status::Closed))
        .is_ok()
    );
  }

  #[test]
  fn assignee_faculty_may_progress_and_resolve() {
    assert!(
      authorize(Role::Faculty, R::Assignee, A::SetStatus(Status::InProgress))
        .is_ok()
    );
    assert!(
      authorize(Role::Faculty, R::Assignee, A::SetStatus(Status::Resolved))
        .is_ok()
    );
    // A faculty member who is not the assignee has no say.
    assert!(denied(Role::Faculty, R::Unrelated, A::SetStatus(Status::Resolved)));
  }

  #[test]
  fn students_never_change_status() {
    for to in [
      Status::Pending,
      Status::InProgress,
      Status::Resolved,
      Status::Closed,
    ] {
      assert!(denied(Role::Student, R::Creator, A::SetStatus(to)));
    }
  }

  #[test]
  fn nobody_sets_pending() {
    for role in [Role::Student, Role::Faculty, Role::Admin] {
      assert!(denied(role, R::Unrelated, A::SetStatus(Status::Pending)));
    }
  }

  #[test]
  fn only_the_creator_leaves_feedback() {
    assert!(authorize(Role::Student, R::Creator, A::AddFeedback).is_ok());
    assert!(denied(Role::Student, R::Unrelated, A::AddFeedback));
    assert!(denied(Role::Faculty, R::Assignee, A::AddFeedback));
  }

  #[test]
  fn reopen_categories_and_export_are_admin_only() {
    for action in [A::Reopen, A::AddCategory, A::Export] {
      assert!(authorize(Role::Admin, R::Unrelated, action).is_ok());
      assert!(denied(Role::Faculty, R::Assignee, action));
      assert!(denied(Role::Student, R::Creator, action));
    }
  }
}
