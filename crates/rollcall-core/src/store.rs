//! The `EnrollmentStore` trait.
//!
//! Implemented by storage backends (e.g. `rollcall-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete
//! backend.
//!
//! Every mutating method is one atomic unit: the capacity check, the
//! occupancy write and the enrollment write it accounts for either all
//! commit or none do. Backends are expected to execute the pure plans
//! from [`crate::transition`] inside that unit rather than re-deriving
//! the rules.

use std::future::Future;

use uuid::Uuid;

use crate::{
  auth::Role,
  enrollment::{CascadeOutcome, Enrollment, EnrollmentRequest, EnrollmentStatus},
  offering::{NewOffering, Offering, OccupancySnapshot, OfferingStatus},
};

/// Abstraction over an enrollment store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EnrollmentStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Offerings ─────────────────────────────────────────────────────────

  /// Create and persist a new offering with zero occupancy.
  fn add_offering(
    &self,
    input: NewOffering,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  /// Retrieve an offering by id. Returns `None` if not found.
  fn get_offering(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Offering>, Self::Error>> + Send + '_;

  fn list_offerings(
    &self,
  ) -> impl Future<Output = Result<Vec<Offering>, Self::Error>> + Send + '_;

  /// Change an offering's declared capacity. Fails when the new value
  /// is below current occupancy (the invariant `occupancy ≤ capacity`
  /// must hold at every commit point).
  fn set_capacity(
    &self,
    id: Uuid,
    capacity: u32,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  /// Change the administrative status. Never touches occupancy.
  fn set_offering_status(
    &self,
    id: Uuid,
    status: OfferingStatus,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  /// Delete an offering no enrollment references.
  fn remove_offering(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read the live occupancy counter next to the declared capacity.
  fn occupancy(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<OccupancySnapshot, Self::Error>> + Send + '_;

  // ── Enrollments ───────────────────────────────────────────────────────

  fn get_enrollment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// The unique record for a `(subject, offering)` pair, if any.
  fn find_enrollment(
    &self,
    subject_id: Uuid,
    offering_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  fn list_for_offering(
    &self,
    offering_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  fn list_for_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// Create-or-reactivate: the capacity check, the enrollment insert
  /// or reset, and the occupancy increment commit atomically.
  fn enroll(
    &self,
    subject_id: Uuid,
    offering_id: Uuid,
    request: EnrollmentRequest,
    role: Role,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Apply a status change with its ledger and rejection-count side
  /// effects. `remarks` overwrites when `Some`, keeps when `None`.
  fn change_status(
    &self,
    enrollment_id: Uuid,
    to: EnrollmentStatus,
    remarks: Option<String>,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Move an enrollment to another offering: decrement the old one,
  /// capacity-check and increment the new one, all in one atomic unit.
  /// If the target is full the whole operation fails and the old
  /// offering is untouched.
  fn change_offering(
    &self,
    enrollment_id: Uuid,
    new_offering_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Delete all of a subject's enrollments and decrement each counted
  /// one's offering, as a single all-or-nothing cascade.
  fn remove_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<CascadeOutcome, Self::Error>> + Send + '_;
}
