//! Caller identity, supplied by the route layer and trusted by the core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Student,
}

/// The authenticated caller of an operation. The core never re-derives
/// identity; authentication itself is an upstream concern.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
  pub subject_id: Uuid,
  pub role:       Role,
}

impl AuthContext {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  /// Whether this actor may operate on records owned by `subject_id`.
  pub fn may_act_for(&self, subject_id: Uuid) -> bool {
    self.is_admin() || self.subject_id == subject_id
  }
}
