//! Offering — a capacity-bounded resource a subject can enroll into.
//!
//! `occupancy` is a denormalized count of enrollments currently holding
//! a slot. It is maintained incrementally by the ledger (never
//! recomputed on read) and must equal the number of counted enrollments
//! after every committed transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Administrative lifecycle status of an offering.
///
/// Independent of capacity: a `Closed` offering may still carry
/// occupancy from enrollments made while it was open.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfferingStatus {
  #[default]
  Active,
  Pending,
  Closed,
}

/// A capacity-bounded enrollable resource (a training schedule or an
/// assessment sitting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
  pub offering_id: Uuid,
  pub title:       String,
  pub capacity:    u32,
  pub occupancy:   u32,
  pub status:      OfferingStatus,
  pub created_at:  DateTime<Utc>,
}

impl Offering {
  /// Slots still available.
  pub fn remaining(&self) -> u32 { self.capacity.saturating_sub(self.occupancy) }
}

/// Input for creating an offering. Occupancy always starts at zero.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOffering {
  pub title:    String,
  pub capacity: u32,
  #[serde(default)]
  pub status:   OfferingStatus,
}

/// The occupancy read model returned by `getOccupancy`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OccupancySnapshot {
  pub occupancy: u32,
  pub capacity:  u32,
}
