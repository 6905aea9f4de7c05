//! Caller identity extraction.
//!
//! Authentication proper (sessions, tokens) is a fronting concern; a
//! trusted proxy forwards the verified identity in two headers:
//!
//! - `x-subject-id`: the caller's subject UUID
//! - `x-role`: `admin` or `student`
//!
//! Requests missing either header, or carrying unparsable values, are
//! rejected with 401 before any handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use rollcall_core::auth::AuthContext;
use uuid::Uuid;

use crate::error::ApiError;

pub const SUBJECT_HEADER: &str = "x-subject-id";
pub const ROLE_HEADER: &str = "x-role";

/// Extractor wrapping the verified [`AuthContext`] of the caller.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub AuthContext);

impl<St> FromRequestParts<St> for Actor
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    let subject_id = header_value(parts, SUBJECT_HEADER)?
      .parse::<Uuid>()
      .map_err(|_| ApiError::Unauthorized(format!("invalid {SUBJECT_HEADER} header")))?;
    let role = header_value(parts, ROLE_HEADER)?
      .parse()
      .map_err(|_| ApiError::Unauthorized(format!("invalid {ROLE_HEADER} header")))?;

    Ok(Actor(AuthContext { subject_id, role }))
  }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
  parts
    .headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
}
