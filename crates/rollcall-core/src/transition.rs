//! The enrollment state machine, expressed as pure planning functions.
//!
//! Backends call these inside their atomic unit and execute the
//! returned plan, so the transition rules exist in exactly one place
//! regardless of how many storage implementations there are.

use crate::{
  Error, Result,
  auth::Role,
  enrollment::{Enrollment, EnrollmentStatus, REJECTION_LIMIT},
  ledger::slot_delta,
};

/// Initial status of a fresh or reactivated enrollment.
///
/// Administrative entry is trusted; self-service requests default to
/// needing review.
pub fn initial_status(role: Role) -> EnrollmentStatus {
  match role {
    Role::Admin => EnrollmentStatus::Active,
    Role::Student => EnrollmentStatus::Pending,
  }
}

/// Plan for a create-or-reactivate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollPlan {
  /// No record exists for the pair: insert one with `status`.
  Create { status: EnrollmentStatus },
  /// A terminated record exists: reset it to `status`, clearing
  /// `remarks` and `cancelled_at`, and apply `delta` to the ledger.
  Reactivate { status: EnrollmentStatus, delta: i32 },
}

/// Decide what an enrollment attempt for a `(subject, offering)` pair
/// should do, given the pair's existing record (if any).
///
/// # Errors
///
/// - [`Error::AlreadyEnrolled`] when a counted or `Completed` record
///   exists.
/// - [`Error::RejectionLimitExceeded`] when the terminated record has
///   reached [`REJECTION_LIMIT`].
pub fn plan_enroll(existing: Option<&Enrollment>, role: Role) -> Result<EnrollPlan> {
  let status = initial_status(role);

  match existing {
    None => Ok(EnrollPlan::Create { status }),
    Some(e) if e.status.counted() || e.status == EnrollmentStatus::Completed => {
      Err(Error::AlreadyEnrolled {
        subject_id:  e.subject_id,
        offering_id: e.offering_id,
      })
    }
    Some(e) => {
      if e.rejection_count >= REJECTION_LIMIT {
        return Err(Error::RejectionLimitExceeded(e.enrollment_id));
      }
      Ok(EnrollPlan::Reactivate { status, delta: slot_delta(e.status, status) })
    }
  }
}

/// Side effects of one status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
  /// Ledger delta for the enrollment's offering.
  pub delta:            i32,
  /// Whether `rejection_count` increments.
  pub bump_rejection:   bool,
  /// Whether `cancelled_at` is stamped with the transition time.
  pub sets_cancelled_at: bool,
}

/// Validate a status change and compute its side effects.
///
/// A record never moves from a non-counted status back into a counted
/// one; reactivation goes through [`plan_enroll`] instead. Transitions
/// between non-counted statuses are allowed as administrative fixups
/// (ledger delta 0).
pub fn plan_status_change(e: &Enrollment, to: EnrollmentStatus) -> Result<StatusChange> {
  if !e.status.counted() && to.counted() {
    return Err(Error::InvalidTransition {
      enrollment_id: e.enrollment_id,
      from:          e.status,
      to,
    });
  }

  Ok(StatusChange {
    delta:             slot_delta(e.status, to),
    bump_rejection:    to.is_terminated() && !e.status.is_terminated(),
    sets_cancelled_at: to == EnrollmentStatus::Cancelled,
  })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::enrollment::EnrollmentStatus::*;

  fn enrollment(status: EnrollmentStatus, rejection_count: u32) -> Enrollment {
    Enrollment {
      enrollment_id: Uuid::new_v4(),
      subject_id: Uuid::new_v4(),
      offering_id: Uuid::new_v4(),
      status,
      rejection_count,
      remarks: None,
      cancelled_at: None,
      payment: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn initial_status_by_role() {
    assert_eq!(initial_status(Role::Admin), Active);
    assert_eq!(initial_status(Role::Student), Pending);
  }

  #[test]
  fn fresh_pair_creates() {
    let plan = plan_enroll(None, Role::Student).unwrap();
    assert_eq!(plan, EnrollPlan::Create { status: Pending });
  }

  #[test]
  fn counted_record_is_already_enrolled() {
    for status in [Pending, Active, Completed] {
      let e = enrollment(status, 0);
      assert!(matches!(
        plan_enroll(Some(&e), Role::Student),
        Err(Error::AlreadyEnrolled { .. })
      ));
    }
  }

  #[test]
  fn terminated_record_reactivates_with_increment() {
    let e = enrollment(Cancelled, 1);
    let plan = plan_enroll(Some(&e), Role::Admin).unwrap();
    assert_eq!(plan, EnrollPlan::Reactivate { status: Active, delta: 1 });
  }

  #[test]
  fn rejection_limit_blocks_reactivation() {
    let e = enrollment(Rejected, REJECTION_LIMIT);
    assert!(matches!(
      plan_enroll(Some(&e), Role::Student),
      Err(Error::RejectionLimitExceeded(_))
    ));
  }

  #[test]
  fn terminal_to_counted_is_illegal() {
    for from in [Completed, Cancelled, Dropped, Rejected] {
      for to in [Pending, Active] {
        let e = enrollment(from, 0);
        assert!(matches!(
          plan_status_change(&e, to),
          Err(Error::InvalidTransition { .. })
        ));
      }
    }
  }

  #[test]
  fn termination_frees_slot_and_bumps() {
    let e = enrollment(Active, 0);
    let change = plan_status_change(&e, Dropped).unwrap();
    assert_eq!(change.delta, -1);
    assert!(change.bump_rejection);
    assert!(!change.sets_cancelled_at);
  }

  #[test]
  fn completion_frees_slot_without_bump() {
    let e = enrollment(Active, 0);
    let change = plan_status_change(&e, Completed).unwrap();
    assert_eq!(change.delta, -1);
    assert!(!change.bump_rejection);
  }

  #[test]
  fn completed_to_cancelled_bumps_without_delta() {
    let e = enrollment(Completed, 0);
    let change = plan_status_change(&e, Cancelled).unwrap();
    assert_eq!(change.delta, 0);
    assert!(change.bump_rejection);
    assert!(change.sets_cancelled_at);
  }

  #[test]
  fn terminal_fixup_has_no_effects() {
    let e = enrollment(Cancelled, 2);
    let change = plan_status_change(&e, Rejected).unwrap();
    assert_eq!(change.delta, 0);
    assert!(!change.bump_rejection);
  }

  #[test]
  fn cancelling_twice_is_inert() {
    let e = enrollment(Cancelled, 1);
    let change = plan_status_change(&e, Cancelled).unwrap();
    assert_eq!(change.delta, 0);
    assert!(!change.bump_rejection);
  }
}
