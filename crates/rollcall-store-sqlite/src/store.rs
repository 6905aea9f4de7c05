//! [`SqliteStore`] — the SQLite implementation of [`EnrollmentStore`].
//!
//! Every mutating operation runs inside one `IMMEDIATE` transaction on
//! the store's single serialized connection, so the capacity check, the
//! occupancy write and the enrollment write commit or fail together.
//! The transition rules themselves come from [`rollcall_core::transition`];
//! this file only executes the plans those functions return.

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use rollcall_core::{
  Error as CoreError,
  auth::Role,
  enrollment::{CascadeOutcome, Enrollment, EnrollmentRequest, EnrollmentStatus},
  ledger,
  offering::{NewOffering, Offering, OccupancySnapshot, OfferingStatus},
  store::EnrollmentStore,
  transition::{self, EnrollPlan},
};

use crate::{
  Error, Result,
  encode::{
    RawEnrollment, RawOffering, encode_dt, encode_enrollment_status,
    encode_offering_status, encode_payment, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall enrollment store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
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

// ─── Closure-side helpers ────────────────────────────────────────────────────
//
// These run on the connection thread, inside `conn.call` closures.
// Business failures travel out through `tokio_rusqlite::Error::Other`
// and are unwrapped again by `Error::from`.

fn domain(e: CoreError) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

fn wrap(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

fn offering_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOffering> {
  Ok(RawOffering {
    offering_id: row.get(0)?,
    title:       row.get(1)?,
    capacity:    row.get(2)?,
    occupancy:   row.get(3)?,
    status:      row.get(4)?,
    created_at:  row.get(5)?,
  })
}

fn enrollment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEnrollment> {
  Ok(RawEnrollment {
    enrollment_id:   row.get(0)?,
    subject_id:      row.get(1)?,
    offering_id:     row.get(2)?,
    status:          row.get(3)?,
    rejection_count: row.get(4)?,
    remarks:         row.get(5)?,
    cancelled_at:    row.get(6)?,
    payment:         row.get(7)?,
    created_at:      row.get(8)?,
    updated_at:      row.get(9)?,
  })
}

fn find_offering(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> rusqlite::Result<Option<RawOffering>> {
  conn
    .query_row(
      "SELECT offering_id, title, capacity, occupancy, status, created_at
       FROM offerings WHERE offering_id = ?1",
      rusqlite::params![encode_uuid(id)],
      offering_from_row,
    )
    .optional()
}

fn find_enrollment_by_id(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> rusqlite::Result<Option<RawEnrollment>> {
  conn
    .query_row(
      "SELECT enrollment_id, subject_id, offering_id, status, rejection_count,
              remarks, cancelled_at, payment, created_at, updated_at
       FROM enrollments WHERE enrollment_id = ?1",
      rusqlite::params![encode_uuid(id)],
      enrollment_from_row,
    )
    .optional()
}

fn find_enrollment_by_pair(
  conn: &rusqlite::Connection,
  subject_id: Uuid,
  offering_id: Uuid,
) -> rusqlite::Result<Option<RawEnrollment>> {
  conn
    .query_row(
      "SELECT enrollment_id, subject_id, offering_id, status, rejection_count,
              remarks, cancelled_at, payment, created_at, updated_at
       FROM enrollments WHERE subject_id = ?1 AND offering_id = ?2",
      rusqlite::params![encode_uuid(subject_id), encode_uuid(offering_id)],
      enrollment_from_row,
    )
    .optional()
}

/// Load an enrollment or fail with the domain not-found error.
fn load_enrollment(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> std::result::Result<Enrollment, tokio_rusqlite::Error> {
  find_enrollment_by_id(conn, id)?
    .ok_or_else(|| domain(CoreError::EnrollmentNotFound(id)))?
    .into_enrollment()
    .map_err(wrap)
}

/// The single code path through which every occupancy write flows.
///
/// Reads the offering's counters, runs the ledger arithmetic, persists
/// the result. Must be called inside the same transaction as the
/// enrollment write it accounts for.
fn adjust_occupancy(
  conn: &rusqlite::Connection,
  offering_id: Uuid,
  delta: i32,
) -> std::result::Result<u32, tokio_rusqlite::Error> {
  let (capacity, occupancy): (u32, u32) = conn
    .query_row(
      "SELECT capacity, occupancy FROM offerings WHERE offering_id = ?1",
      rusqlite::params![encode_uuid(offering_id)],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or_else(|| domain(CoreError::OfferingNotFound(offering_id)))?;

  let adj = ledger::try_adjust(offering_id, capacity, occupancy, delta).map_err(domain)?;
  if adj.clamped {
    // Recovered locally; operators still need to see it.
    tracing::warn!(
      offering_id = %offering_id,
      "occupancy decrement clamped at zero; ledger inconsistency suspected"
    );
  }

  conn.execute(
    "UPDATE offerings SET occupancy = ?2 WHERE offering_id = ?1",
    rusqlite::params![encode_uuid(offering_id), adj.occupancy],
  )?;
  Ok(adj.occupancy)
}

fn insert_enrollment(
  conn: &rusqlite::Connection,
  e: &Enrollment,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let payment = encode_payment(e.payment.as_ref()).map_err(wrap)?;
  conn.execute(
    "INSERT INTO enrollments (
       enrollment_id, subject_id, offering_id, status, rejection_count,
       remarks, cancelled_at, payment, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    rusqlite::params![
      encode_uuid(e.enrollment_id),
      encode_uuid(e.subject_id),
      encode_uuid(e.offering_id),
      encode_enrollment_status(e.status),
      e.rejection_count,
      e.remarks,
      e.cancelled_at.map(encode_dt),
      payment,
      encode_dt(e.created_at),
      encode_dt(e.updated_at),
    ],
  )?;
  Ok(())
}

fn update_enrollment(
  conn: &rusqlite::Connection,
  e: &Enrollment,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let payment = encode_payment(e.payment.as_ref()).map_err(wrap)?;
  conn.execute(
    "UPDATE enrollments
     SET offering_id = ?2, status = ?3, rejection_count = ?4,
         remarks = ?5, cancelled_at = ?6, payment = ?7, updated_at = ?8
     WHERE enrollment_id = ?1",
    rusqlite::params![
      encode_uuid(e.enrollment_id),
      encode_uuid(e.offering_id),
      encode_enrollment_status(e.status),
      e.rejection_count,
      e.remarks,
      e.cancelled_at.map(encode_dt),
      payment,
      encode_dt(e.updated_at),
    ],
  )?;
  Ok(())
}

// ─── EnrollmentStore impl ────────────────────────────────────────────────────

impl EnrollmentStore for SqliteStore {
  type Error = Error;

  // ── Offerings ─────────────────────────────────────────────────────────────

  async fn add_offering(&self, input: NewOffering) -> Result<Offering> {
    let offering = Offering {
      offering_id: Uuid::new_v4(),
      title:       input.title,
      capacity:    input.capacity,
      occupancy:   0,
      status:      input.status,
      created_at:  Utc::now(),
    };

    let id_str     = encode_uuid(offering.offering_id);
    let title      = offering.title.clone();
    let capacity   = offering.capacity;
    let status_str = encode_offering_status(offering.status);
    let at_str     = encode_dt(offering.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO offerings (offering_id, title, capacity, occupancy, status, created_at)
           VALUES (?1, ?2, ?3, 0, ?4, ?5)",
          rusqlite::params![id_str, title, capacity, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(offering)
  }

  async fn get_offering(&self, id: Uuid) -> Result<Option<Offering>> {
    let raw = self.conn.call(move |conn| Ok(find_offering(conn, id)?)).await?;
    raw.map(RawOffering::into_offering).transpose()
  }

  async fn list_offerings(&self) -> Result<Vec<Offering>> {
    let raws: Vec<RawOffering> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT offering_id, title, capacity, occupancy, status, created_at
           FROM offerings ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], offering_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOffering::into_offering).collect()
  }

  async fn set_capacity(&self, id: Uuid, capacity: u32) -> Result<Offering> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut raw = find_offering(&tx, id)?
          .ok_or_else(|| domain(CoreError::OfferingNotFound(id)))?;
        // Shrinking below live occupancy would commit a state where
        // occupancy > capacity.
        if capacity < raw.occupancy {
          return Err(domain(CoreError::CapacityExceeded { offering_id: id, capacity }));
        }

        tx.execute(
          "UPDATE offerings SET capacity = ?2 WHERE offering_id = ?1",
          rusqlite::params![encode_uuid(id), capacity],
        )?;
        tx.commit()?;

        raw.capacity = capacity;
        Ok(raw)
      })
      .await?;

    raw.into_offering()
  }

  async fn set_offering_status(&self, id: Uuid, status: OfferingStatus) -> Result<Offering> {
    let status_str = encode_offering_status(status);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut raw = find_offering(&tx, id)?
          .ok_or_else(|| domain(CoreError::OfferingNotFound(id)))?;

        tx.execute(
          "UPDATE offerings SET status = ?2 WHERE offering_id = ?1",
          rusqlite::params![encode_uuid(id), status_str.clone()],
        )?;
        tx.commit()?;

        raw.status = status_str;
        Ok(raw)
      })
      .await?;

    raw.into_offering()
  }

  async fn remove_offering(&self, id: Uuid) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if find_offering(&tx, id)?.is_none() {
          return Err(domain(CoreError::OfferingNotFound(id)));
        }

        let referenced: u32 = tx.query_row(
          "SELECT COUNT(*) FROM enrollments WHERE offering_id = ?1",
          rusqlite::params![encode_uuid(id)],
          |row| row.get(0),
        )?;
        if referenced > 0 {
          return Err(domain(CoreError::OfferingInUse(id)));
        }

        tx.execute(
          "DELETE FROM offerings WHERE offering_id = ?1",
          rusqlite::params![encode_uuid(id)],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn occupancy(&self, id: Uuid) -> Result<OccupancySnapshot> {
    let snapshot = self
      .conn
      .call(move |conn| {
        conn
          .query_row(
            "SELECT occupancy, capacity FROM offerings WHERE offering_id = ?1",
            rusqlite::params![encode_uuid(id)],
            |row| {
              Ok(OccupancySnapshot { occupancy: row.get(0)?, capacity: row.get(1)? })
            },
          )
          .optional()?
          .ok_or_else(|| domain(CoreError::OfferingNotFound(id)))
      })
      .await?;
    Ok(snapshot)
  }

  // ── Enrollment reads ──────────────────────────────────────────────────────

  async fn get_enrollment(&self, id: Uuid) -> Result<Option<Enrollment>> {
    let raw = self
      .conn
      .call(move |conn| Ok(find_enrollment_by_id(conn, id)?))
      .await?;
    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn find_enrollment(
    &self,
    subject_id: Uuid,
    offering_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    let raw = self
      .conn
      .call(move |conn| Ok(find_enrollment_by_pair(conn, subject_id, offering_id)?))
      .await?;
    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn list_for_offering(&self, offering_id: Uuid) -> Result<Vec<Enrollment>> {
    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT enrollment_id, subject_id, offering_id, status, rejection_count,
                  remarks, cancelled_at, payment, created_at, updated_at
           FROM enrollments WHERE offering_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![encode_uuid(offering_id)], enrollment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }

  async fn list_for_subject(&self, subject_id: Uuid) -> Result<Vec<Enrollment>> {
    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT enrollment_id, subject_id, offering_id, status, rejection_count,
                  remarks, cancelled_at, payment, created_at, updated_at
           FROM enrollments WHERE subject_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![encode_uuid(subject_id)], enrollment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  async fn enroll(
    &self,
    subject_id: Uuid,
    offering_id: Uuid,
    request: EnrollmentRequest,
    role: Role,
  ) -> Result<Enrollment> {
    let enrollment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = find_enrollment_by_pair(&tx, subject_id, offering_id)?
          .map(|raw| raw.into_enrollment().map_err(wrap))
          .transpose()?;

        let plan = transition::plan_enroll(existing.as_ref(), role).map_err(domain)?;
        let now = Utc::now();

        let enrollment = match plan {
          EnrollPlan::Create { status } => {
            adjust_occupancy(&tx, offering_id, 1)?;
            let enrollment = Enrollment {
              enrollment_id: Uuid::new_v4(),
              subject_id,
              offering_id,
              status,
              rejection_count: 0,
              remarks: request.remarks,
              cancelled_at: None,
              payment: request.payment,
              created_at: now,
              updated_at: now,
            };
            insert_enrollment(&tx, &enrollment)?;
            enrollment
          }
          EnrollPlan::Reactivate { status, delta } => {
            let Some(prior) = existing else {
              return Err(domain(CoreError::Storage(
                "reactivation plan without an existing record".into(),
              )));
            };
            if delta != 0 {
              adjust_occupancy(&tx, offering_id, delta)?;
            }
            let enrollment = Enrollment {
              status,
              remarks: request.remarks,
              cancelled_at: None,
              payment: request.payment,
              updated_at: now,
              ..prior
            };
            update_enrollment(&tx, &enrollment)?;
            enrollment
          }
        };

        tx.commit()?;
        Ok(enrollment)
      })
      .await?;

    Ok(enrollment)
  }

  async fn change_status(
    &self,
    enrollment_id: Uuid,
    to: EnrollmentStatus,
    remarks: Option<String>,
  ) -> Result<Enrollment> {
    let enrollment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let e = load_enrollment(&tx, enrollment_id)?;
        let change = transition::plan_status_change(&e, to).map_err(domain)?;

        if change.delta != 0 {
          adjust_occupancy(&tx, e.offering_id, change.delta)?;
        }

        let now = Utc::now();
        let updated = Enrollment {
          status:          to,
          rejection_count: e.rejection_count + u32::from(change.bump_rejection),
          remarks:         remarks.or_else(|| e.remarks.clone()),
          cancelled_at:    if change.sets_cancelled_at { Some(now) } else { e.cancelled_at },
          updated_at:      now,
          ..e
        };
        update_enrollment(&tx, &updated)?;

        tx.commit()?;
        Ok(updated)
      })
      .await?;

    Ok(enrollment)
  }

  async fn change_offering(
    &self,
    enrollment_id: Uuid,
    new_offering_id: Uuid,
  ) -> Result<Enrollment> {
    let enrollment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let e = load_enrollment(&tx, enrollment_id)?;
        if e.offering_id == new_offering_id {
          return Ok(e);
        }

        // The target pair's record (even a terminated one) is owned by
        // the reuse-on-reactivation path; a move cannot merge histories.
        if find_enrollment_by_pair(&tx, e.subject_id, new_offering_id)?.is_some() {
          return Err(domain(CoreError::AlreadyEnrolled {
            subject_id:  e.subject_id,
            offering_id: new_offering_id,
          }));
        }

        if e.status.counted() {
          // Target first: if it is full the transaction aborts with the
          // source offering untouched.
          adjust_occupancy(&tx, new_offering_id, 1)?;
          adjust_occupancy(&tx, e.offering_id, -1)?;
        } else if find_offering(&tx, new_offering_id)?.is_none() {
          return Err(domain(CoreError::OfferingNotFound(new_offering_id)));
        }

        let updated = Enrollment {
          offering_id: new_offering_id,
          updated_at:  Utc::now(),
          ..e
        };
        update_enrollment(&tx, &updated)?;

        tx.commit()?;
        Ok(updated)
      })
      .await?;

    Ok(enrollment)
  }

  async fn remove_subject(&self, subject_id: Uuid) -> Result<CascadeOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rows: Vec<(String, String)> = {
          let mut stmt = tx.prepare(
            "SELECT offering_id, status FROM enrollments WHERE subject_id = ?1",
          )?;
          stmt
            .query_map(rusqlite::params![encode_uuid(subject_id)], |row| {
              Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut affected: Vec<Uuid> = Vec::new();
        for (offering_str, status_str) in &rows {
          let status = crate::encode::decode_enrollment_status(status_str).map_err(wrap)?;
          if status.counted() {
            let offering_id = crate::encode::decode_uuid(offering_str).map_err(wrap)?;
            adjust_occupancy(&tx, offering_id, -1)?;
            if !affected.contains(&offering_id) {
              affected.push(offering_id);
            }
          }
        }

        let removed = tx.execute(
          "DELETE FROM enrollments WHERE subject_id = ?1",
          rusqlite::params![encode_uuid(subject_id)],
        )?;

        tx.commit()?;
        Ok(CascadeOutcome {
          removed_enrollments: removed,
          affected_offerings:  affected,
        })
      })
      .await?;

    Ok(outcome)
  }
}
