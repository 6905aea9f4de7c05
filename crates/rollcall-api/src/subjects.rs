//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects/:id/enrollments` | Self or admin |
//! | `DELETE` | `/subjects/:id` | Admin; cascades counted enrollments |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use rollcall_core::{
  Registrar,
  enrollment::{CascadeOutcome, Enrollment},
  notify::NotificationSink,
  store::EnrollmentStore,
};
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

/// `GET /subjects/:id/enrollments`
pub async fn enrollments<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Enrollment>>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.list_for_subject(&actor, id).await?))
}

/// `DELETE /subjects/:id`
pub async fn delete_one<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<CascadeOutcome>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.delete_subject_cascade(&actor, id).await?))
}
