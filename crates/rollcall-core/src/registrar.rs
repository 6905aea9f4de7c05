//! The registrar — the operation surface offered to thin route
//! handlers.
//!
//! Each operation checks the actor's rights, delegates to exactly one
//! atomic [`EnrollmentStore`] call, and then informs the
//! [`NotificationSink`] best-effort. Notification happens strictly
//! after commit and its outcome is ignored.

use uuid::Uuid;

use crate::{
  Error, Result,
  auth::AuthContext,
  enrollment::{CascadeOutcome, Enrollment, EnrollmentRequest, EnrollmentStatus},
  notify::{NotificationSink, RelatedEntity},
  offering::{NewOffering, Offering, OccupancySnapshot, OfferingStatus},
  store::EnrollmentStore,
};

pub struct Registrar<S, N> {
  store: S,
  sink:  N,
}

impl<S, N> Registrar<S, N>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  pub fn new(store: S, sink: N) -> Self { Self { store, sink } }

  pub fn store(&self) -> &S { &self.store }

  // ── Offerings ─────────────────────────────────────────────────────────

  pub async fn create_offering(
    &self,
    actor: &AuthContext,
    input: NewOffering,
  ) -> Result<Offering> {
    self.require_admin(actor, "only administrators may create offerings")?;
    self.store.add_offering(input).await.map_err(Into::into)
  }

  pub async fn get_offering(&self, id: Uuid) -> Result<Offering> {
    self
      .store
      .get_offering(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::OfferingNotFound(id))
  }

  pub async fn list_offerings(&self) -> Result<Vec<Offering>> {
    self.store.list_offerings().await.map_err(Into::into)
  }

  pub async fn set_capacity(
    &self,
    actor: &AuthContext,
    id: Uuid,
    capacity: u32,
  ) -> Result<Offering> {
    self.require_admin(actor, "only administrators may edit capacity")?;
    self.store.set_capacity(id, capacity).await.map_err(Into::into)
  }

  pub async fn set_offering_status(
    &self,
    actor: &AuthContext,
    id: Uuid,
    status: OfferingStatus,
  ) -> Result<Offering> {
    self.require_admin(actor, "only administrators may edit offerings")?;
    self
      .store
      .set_offering_status(id, status)
      .await
      .map_err(Into::into)
  }

  pub async fn remove_offering(&self, actor: &AuthContext, id: Uuid) -> Result<()> {
    self.require_admin(actor, "only administrators may delete offerings")?;
    self.store.remove_offering(id).await.map_err(Into::into)
  }

  pub async fn occupancy(&self, id: Uuid) -> Result<OccupancySnapshot> {
    self.store.occupancy(id).await.map_err(Into::into)
  }

  // ── Enrollments ───────────────────────────────────────────────────────

  /// Create-or-reactivate an enrollment for `(subject, offering)`.
  ///
  /// Students may only enroll themselves; administrators may enroll
  /// anyone (and their enrollments start `Active` rather than
  /// `Pending`).
  pub async fn create_or_reactivate(
    &self,
    actor: &AuthContext,
    subject_id: Uuid,
    offering_id: Uuid,
    request: EnrollmentRequest,
  ) -> Result<Enrollment> {
    if !actor.may_act_for(subject_id) {
      return Err(Error::Forbidden("students may only enroll themselves"));
    }

    let enrollment = self
      .store
      .enroll(subject_id, offering_id, request, actor.role)
      .await
      .map_err(Into::into)?;

    self
      .sink
      .notify(
        Some(subject_id),
        &format!("enrollment received with status {}", enrollment.status),
        RelatedEntity::Enrollment(enrollment.enrollment_id),
      )
      .await;

    Ok(enrollment)
  }

  pub async fn get_enrollment(&self, id: Uuid) -> Result<Enrollment> {
    self
      .store
      .get_enrollment(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::EnrollmentNotFound(id))
  }

  pub async fn list_for_offering(
    &self,
    actor: &AuthContext,
    offering_id: Uuid,
  ) -> Result<Vec<Enrollment>> {
    self.require_admin(actor, "only administrators may list an offering's roster")?;
    self.store.list_for_offering(offering_id).await.map_err(Into::into)
  }

  pub async fn list_for_subject(
    &self,
    actor: &AuthContext,
    subject_id: Uuid,
  ) -> Result<Vec<Enrollment>> {
    if !actor.may_act_for(subject_id) {
      return Err(Error::Forbidden("students may only list their own enrollments"));
    }
    self.store.list_for_subject(subject_id).await.map_err(Into::into)
  }

  /// Administrative status change.
  pub async fn change_status(
    &self,
    actor: &AuthContext,
    enrollment_id: Uuid,
    to: EnrollmentStatus,
    remarks: Option<String>,
  ) -> Result<Enrollment> {
    self.require_admin(actor, "only administrators may change enrollment status")?;

    let enrollment = self
      .store
      .change_status(enrollment_id, to, remarks)
      .await
      .map_err(Into::into)?;

    self
      .sink
      .notify(
        Some(enrollment.subject_id),
        &format!("your enrollment status changed to {to}"),
        RelatedEntity::Enrollment(enrollment_id),
      )
      .await;

    Ok(enrollment)
  }

  /// Administrative move to another offering.
  pub async fn change_offering(
    &self,
    actor: &AuthContext,
    enrollment_id: Uuid,
    new_offering_id: Uuid,
  ) -> Result<Enrollment> {
    self.require_admin(actor, "only administrators may move enrollments")?;

    let enrollment = self
      .store
      .change_offering(enrollment_id, new_offering_id)
      .await
      .map_err(Into::into)?;

    self
      .sink
      .notify(
        Some(enrollment.subject_id),
        "your enrollment was moved to another offering",
        RelatedEntity::Offering(new_offering_id),
      )
      .await;

    Ok(enrollment)
  }

  /// Cancel an enrollment. Owning subject or an administrator.
  ///
  /// Cancelling an already-cancelled enrollment is a no-op success.
  pub async fn cancel(&self, actor: &AuthContext, enrollment_id: Uuid) -> Result<Enrollment> {
    let existing = self.get_enrollment(enrollment_id).await?;

    if !actor.may_act_for(existing.subject_id) {
      return Err(Error::Forbidden("students may only cancel their own enrollments"));
    }
    if existing.status == EnrollmentStatus::Cancelled {
      return Ok(existing);
    }

    let enrollment = self
      .store
      .change_status(enrollment_id, EnrollmentStatus::Cancelled, None)
      .await
      .map_err(Into::into)?;

    self
      .sink
      .notify(
        Some(enrollment.subject_id),
        "your enrollment has been cancelled",
        RelatedEntity::Enrollment(enrollment_id),
      )
      .await;

    Ok(enrollment)
  }

  /// Remove a subject and reconcile the ledger for every counted
  /// enrollment they held.
  pub async fn delete_subject_cascade(
    &self,
    actor: &AuthContext,
    subject_id: Uuid,
  ) -> Result<CascadeOutcome> {
    self.require_admin(actor, "only administrators may delete subjects")?;

    let outcome = self.store.remove_subject(subject_id).await.map_err(Into::into)?;

    if outcome.removed_enrollments > 0 {
      self
        .sink
        .notify(
          None,
          &format!(
            "subject removed; {} enrollment(s) cascaded",
            outcome.removed_enrollments
          ),
          RelatedEntity::Subject(subject_id),
        )
        .await;
    }

    Ok(outcome)
  }

  fn require_admin(&self, actor: &AuthContext, denied: &'static str) -> Result<()> {
    if actor.is_admin() { Ok(()) } else { Err(Error::Forbidden(denied)) }
  }
}
