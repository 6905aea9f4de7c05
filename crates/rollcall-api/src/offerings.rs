//! Handlers for `/offerings` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/offerings` | Public list |
//! | `POST`   | `/offerings` | Admin; body: `{"title":..,"capacity":..}` |
//! | `GET`    | `/offerings/:id` | 404 if not found |
//! | `DELETE` | `/offerings/:id` | Admin; 409 while enrollments reference it |
//! | `PUT`    | `/offerings/:id/capacity` | Admin; 409 below current occupancy |
//! | `PUT`    | `/offerings/:id/status` | Admin |
//! | `GET`    | `/offerings/:id/occupancy` | Public occupancy snapshot |
//! | `GET`    | `/offerings/:id/enrollments` | Admin roster |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  Registrar,
  enrollment::Enrollment,
  notify::NotificationSink,
  offering::{NewOffering, OccupancySnapshot, Offering, OfferingStatus},
  store::EnrollmentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /offerings`
pub async fn list<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
) -> Result<Json<Vec<Offering>>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.list_offerings().await?))
}

/// `POST /offerings`
pub async fn create<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Json(body): Json<NewOffering>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  let offering = registrar.create_offering(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(offering)))
}

// ─── Single offering ──────────────────────────────────────────────────────────

/// `GET /offerings/:id`
pub async fn get_one<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Offering>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.get_offering(id).await?))
}

/// `DELETE /offerings/:id`
pub async fn delete_one<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  registrar.remove_offering(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CapacityBody {
  pub capacity: u32,
}

/// `PUT /offerings/:id/capacity`
pub async fn set_capacity<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<CapacityBody>,
) -> Result<Json<Offering>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.set_capacity(&actor, id, body.capacity).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: OfferingStatus,
}

/// `PUT /offerings/:id/status`
pub async fn set_status<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Offering>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.set_offering_status(&actor, id, body.status).await?))
}

// ─── Read models ──────────────────────────────────────────────────────────────

/// `GET /offerings/:id/occupancy`
pub async fn occupancy<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OccupancySnapshot>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.occupancy(id).await?))
}

/// `GET /offerings/:id/enrollments`
pub async fn roster<S, N>(
  State(registrar): State<Arc<Registrar<S, N>>>,
  Actor(actor): Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Enrollment>>, ApiError>
where
  S: EnrollmentStore,
  N: NotificationSink,
{
  Ok(Json(registrar.list_for_offering(&actor, id).await?))
}
