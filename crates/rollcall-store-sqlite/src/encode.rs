//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Status enums are
//! stored as their lowercase `strum` renderings. The payment blob is
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use rollcall_core::{
  enrollment::{Enrollment, EnrollmentStatus, PaymentRecord},
  offering::{Offering, OfferingStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Statuses ─────────────────────────────────────────────────────────────────

pub fn encode_offering_status(s: OfferingStatus) -> String { s.to_string() }

pub fn decode_offering_status(s: &str) -> Result<OfferingStatus> {
  s.parse().map_err(|_| Error::StatusParse(s.to_owned()))
}

pub fn encode_enrollment_status(s: EnrollmentStatus) -> String { s.to_string() }

pub fn decode_enrollment_status(s: &str) -> Result<EnrollmentStatus> {
  s.parse().map_err(|_| Error::StatusParse(s.to_owned()))
}

// ─── Payment blob ─────────────────────────────────────────────────────────────

pub fn encode_payment(p: Option<&PaymentRecord>) -> Result<Option<String>> {
  p.map(|p| serde_json::to_string(p).map_err(Error::Json)).transpose()
}

pub fn decode_payment(s: Option<&str>) -> Result<Option<PaymentRecord>> {
  s.map(|s| serde_json::from_str(s).map_err(Error::Json)).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `offerings` row.
pub struct RawOffering {
  pub offering_id: String,
  pub title:       String,
  pub capacity:    u32,
  pub occupancy:   u32,
  pub status:      String,
  pub created_at:  String,
}

impl RawOffering {
  pub fn into_offering(self) -> Result<Offering> {
    Ok(Offering {
      offering_id: decode_uuid(&self.offering_id)?,
      title:       self.title,
      capacity:    self.capacity,
      occupancy:   self.occupancy,
      status:      decode_offering_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub enrollment_id:   String,
  pub subject_id:      String,
  pub offering_id:     String,
  pub status:          String,
  pub rejection_count: u32,
  pub remarks:         Option<String>,
  pub cancelled_at:    Option<String>,
  pub payment:         Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawEnrollment {
  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      enrollment_id:   decode_uuid(&self.enrollment_id)?,
      subject_id:      decode_uuid(&self.subject_id)?,
      offering_id:     decode_uuid(&self.offering_id)?,
      status:          decode_enrollment_status(&self.status)?,
      rejection_count: self.rejection_count,
      remarks:         self.remarks,
      cancelled_at:    self.cancelled_at.as_deref().map(decode_dt).transpose()?,
      payment:         decode_payment(self.payment.as_deref())?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}
