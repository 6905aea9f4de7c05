//! Handlers for `/enrollments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/enrollments` | Create-or-reactivate; students self only |
//! | `GET`  | `/enrollments/:id` | 404 if not found |
//! | `POST` | `/enrollments/:id/status` | Admin transition |
//! | `POST` | `/enrollments/:id/offering` | Admin move |
//! | `POST` | `/enrollments/:id/cancel` | Owner or admin; idempotent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  Registrar,
  enrollment::{Enrollment, EnrollmentRequest, EnrollmentStatus},
  notify::NotificationSink,
  store::EnrollmentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// Defaults to the caller; only administrators may name someone else.
  pub subject_id:  Option<Uuid>,
  pub offering_id: Uuid,
  #[serde(flatten)]
  pub request:     EnrollmentRequest,
}

/// `POST /enrollments`
pub async fn create<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  let subject_id = body.subject_id.unwrap_or(actor.subject_id);
  let enrollment = registrar
    .create_or_reactivate(&actor, subject_id, body.offering_id, body.request)
    .await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /enrollments/:id`
pub async fn get_one<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.get_enrollment(id).await?))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status:  EnrollmentStatus,
  pub remarks: Option<String>,
}

/// `POST /enrollments/:id/status`
pub async fn change_status<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  let enrollment = registrar
    .change_status(&actor, id, body.status, body.remarks)
    .await?;
  Ok(Json(enrollment))
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub offering_id: Uuid,
}

/// `POST /enrollments/:id/offering`
pub async fn change_offering<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<MoveBody>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.change_offering(&actor, id, body.offering_id).await?))
}

/// `POST /enrollments/:id/cancel`
pub async fn cancel<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.cancel(&actor, id).await?))
}
