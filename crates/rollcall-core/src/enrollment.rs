//! Enrollment — a subject's relationship record to exactly one offering.
//!
//! There is at most one record per `(subject, offering)` pair, ever. A
//! terminated record is reused and reset on the next enrollment attempt
//! rather than duplicated, preserving `rejection_count` history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of terminations after which self-service re-enrollment for
/// the same `(subject, offering)` pair is permanently blocked.
pub const REJECTION_LIMIT: u32 = 3;

/// Lifecycle status of an enrollment.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnrollmentStatus {
  Pending,
  Active,
  Completed,
  Cancelled,
  Dropped,
  Rejected,
}

impl EnrollmentStatus {
  /// Whether this status occupies one unit of the offering's capacity.
  pub fn counted(self) -> bool {
    matches!(self, Self::Pending | Self::Active)
  }

  /// Terminal-non-completed statuses: the record may be reactivated
  /// through the create path, subject to the rejection gate.
  pub fn is_terminated(self) -> bool {
    matches!(self, Self::Cancelled | Self::Dropped | Self::Rejected)
  }
}

/// Opaque payment attachment. Stored with an enrollment, never
/// interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
  pub method:    String,
  pub reference: String,
  pub proof:     Option<String>,
}

/// A subject's relationship to one offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id:   Uuid,
  pub subject_id:      Uuid,
  pub offering_id:     Uuid,
  pub status:          EnrollmentStatus,
  /// Incremented on every transition into a terminated status from
  /// outside that set; gates re-enrollment at [`REJECTION_LIMIT`].
  pub rejection_count: u32,
  pub remarks:         Option<String>,
  pub cancelled_at:    Option<DateTime<Utc>>,
  pub payment:         Option<PaymentRecord>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Caller-supplied payload for a create-or-reactivate attempt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentRequest {
  pub remarks: Option<String>,
  pub payment: Option<PaymentRecord>,
}

/// Result of a subject-deletion cascade.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeOutcome {
  pub removed_enrollments: usize,
  /// Offerings whose occupancy was decremented, deduplicated.
  pub affected_offerings:  Vec<Uuid>,
}
