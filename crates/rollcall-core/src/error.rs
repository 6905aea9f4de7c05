//! Error types for `rollcall-core`.
//!
//! Every variant except [`Error::Storage`] is an expected business
//! outcome; the route layer maps them to user-facing responses. Ledger
//! clamping (a decrement that would go negative) is deliberately *not*
//! here — it is recovered locally and surfaced to logs only.

use thiserror::Error;
use uuid::Uuid;

use crate::enrollment::EnrollmentStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("offering not found: {0}")]
  OfferingNotFound(Uuid),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(Uuid),

  #[error(
    "offering {offering_id} cannot hold more than {capacity} enrollments; \
     pick another offering or try again once a slot frees up"
  )]
  CapacityExceeded { offering_id: Uuid, capacity: u32 },

  #[error("subject {subject_id} already has an active enrollment in offering {offering_id}")]
  AlreadyEnrolled { subject_id: Uuid, offering_id: Uuid },

  #[error(
    "enrollment {0} has been terminated too many times; \
     further self-service attempts are blocked, contact an administrator"
  )]
  RejectionLimitExceeded(Uuid),

  #[error("enrollment {enrollment_id}: illegal transition from {from} to {to}")]
  InvalidTransition {
    enrollment_id: Uuid,
    from:          EnrollmentStatus,
    to:            EnrollmentStatus,
  },

  #[error("offering {0} still has enrollments referencing it and cannot be deleted")]
  OfferingInUse(Uuid),

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
