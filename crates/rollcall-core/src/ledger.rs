//! Capacity ledger — the single place occupancy arithmetic happens.
//!
//! Storage backends must call [`try_adjust`] inside the same atomic
//! unit as the enrollment write it accounts for; the arithmetic itself
//! is pure so it can be tested without a database.

use uuid::Uuid;

use crate::{Error, Result, enrollment::EnrollmentStatus};

/// Outcome of one admissible occupancy adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
  /// The occupancy to persist.
  pub occupancy: u32,
  /// True when a decrement was clamped at zero. The ledger must never
  /// go negative; a clamp means a prior adjustment was lost and should
  /// be logged as a consistency warning by the caller.
  pub clamped:   bool,
}

/// Decide whether adjusting `occupancy` by `delta` (−1, 0 or +1; a
/// transition affects at most one slot) is admissible against
/// `capacity`, and by what value to replace it.
///
/// # Errors
///
/// [`Error::CapacityExceeded`] when an increment would push occupancy
/// past capacity. No clamping happens on that path: the caller must
/// abort without writing.
pub fn try_adjust(
  offering_id: Uuid,
  capacity:    u32,
  occupancy:   u32,
  delta:       i32,
) -> Result<Adjustment> {
  debug_assert!((-1..=1).contains(&delta));

  if delta > 0 {
    let next = occupancy + delta as u32;
    if next > capacity {
      return Err(Error::CapacityExceeded { offering_id, capacity });
    }
    return Ok(Adjustment { occupancy: next, clamped: false });
  }

  let dec = delta.unsigned_abs();
  match occupancy.checked_sub(dec) {
    Some(next) => Ok(Adjustment { occupancy: next, clamped: false }),
    None => Ok(Adjustment { occupancy: 0, clamped: true }),
  }
}

/// The ledger delta implied by a status change: +1 when a slot is
/// taken, −1 when one is freed, 0 otherwise.
pub fn slot_delta(from: EnrollmentStatus, to: EnrollmentStatus) -> i32 {
  match (from.counted(), to.counted()) {
    (false, true) => 1,
    (true, false) => -1,
    _ => 0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::enrollment::EnrollmentStatus::*;

  #[test]
  fn increment_within_capacity() {
    let adj = try_adjust(Uuid::new_v4(), 3, 2, 1).unwrap();
    assert_eq!(adj, Adjustment { occupancy: 3, clamped: false });
  }

  #[test]
  fn increment_past_capacity_fails() {
    let id = Uuid::new_v4();
    let err = try_adjust(id, 3, 3, 1).unwrap_err();
    assert!(matches!(
      err,
      Error::CapacityExceeded { offering_id, capacity: 3 } if offering_id == id
    ));
  }

  #[test]
  fn zero_capacity_admits_nothing() {
    assert!(try_adjust(Uuid::new_v4(), 0, 0, 1).is_err());
  }

  #[test]
  fn decrement_clamps_at_zero() {
    let adj = try_adjust(Uuid::new_v4(), 5, 0, -1).unwrap();
    assert_eq!(adj, Adjustment { occupancy: 0, clamped: true });
  }

  #[test]
  fn zero_delta_is_identity() {
    let adj = try_adjust(Uuid::new_v4(), 5, 4, 0).unwrap();
    assert_eq!(adj, Adjustment { occupancy: 4, clamped: false });
  }

  #[test]
  fn slot_delta_matrix() {
    assert_eq!(slot_delta(Cancelled, Active), 1);
    assert_eq!(slot_delta(Active, Cancelled), -1);
    assert_eq!(slot_delta(Pending, Active), 0);
    assert_eq!(slot_delta(Completed, Rejected), 0);
    assert_eq!(slot_delta(Active, Completed), -1);
  }
}
