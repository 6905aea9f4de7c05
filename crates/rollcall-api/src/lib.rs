//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::EnrollmentStore`] behind a
//! [`rollcall_core::Registrar`]. Authentication, TLS, and transport
//! concerns are the caller's responsibility; the caller's verified
//! identity arrives in `x-subject-id` / `x-role` headers (see
//! [`actor`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(registrar.clone()))
//! ```

pub mod actor;
pub mod enrollments;
pub mod error;
pub mod offerings;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use rollcall_core::{Registrar, notify::NotificationSink, store::EnrollmentStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `registrar`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, N>(registrar: Arc<Registrar<S, N>>) -> Router<()>
where
  S: EnrollmentStore + 'static,
  N: NotificationSink + 'static,
{
  Router::new()
    // Offerings
    .route(
      "/offerings",
      get(offerings::list::<S, N>).post(offerings::create::<S, N>),
    )
    .route(
      "/offerings/{id}",
      get(offerings::get_one::<S, N>).delete(offerings::delete_one::<S, N>),
    )
    .route("/offerings/{id}/capacity", put(offerings::set_capacity::<S, N>))
    .route("/offerings/{id}/status", put(offerings::set_status::<S, N>))
    .route("/offerings/{id}/occupancy", get(offerings::occupancy::<S, N>))
    .route("/offerings/{id}/enrollments", get(offerings::roster::<S, N>))
    // Enrollments
    .route("/enrollments", post(enrollments::create::<S, N>))
    .route("/enrollments/{id}", get(enrollments::get_one::<S, N>))
    .route("/enrollments/{id}/status", post(enrollments::change_status::<S, N>))
    .route("/enrollments/{id}/offering", post(enrollments::change_offering::<S, N>))
    .route("/enrollments/{id}/cancel", post(enrollments::cancel::<S, N>))
    // Subjects
    .route("/subjects/{id}", delete(subjects::delete_one::<S, N>))
    .route("/subjects/{id}/enrollments", get(subjects::enrollments::<S, N>))
    .with_state(registrar)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use rollcall_core::{
    auth::{AuthContext, Role},
    notify::NullSink,
  };
  use rollcall_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn app() -> Router<()> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(Registrar::new(store, NullSink)))
  }

  fn admin() -> AuthContext {
    AuthContext { subject_id: Uuid::new_v4(), role: Role::Admin }
  }

  fn student() -> AuthContext {
    AuthContext { subject_id: Uuid::new_v4(), role: Role::Student }
  }

  async fn send(
    app: &Router<()>,
    method: &str,
    uri: &str,
    actor: Option<&AuthContext>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
      builder = builder
        .header("x-subject-id", actor.subject_id.to_string())
        .header("x-role", actor.role.to_string());
    }
    let req = match body {
      Some(body) => builder
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_offering(app: &Router<()>, actor: &AuthContext, capacity: u32) -> Uuid {
    let (status, body) = send(
      app,
      "POST",
      "/offerings",
      Some(actor),
      Some(json!({ "title": "Working at Heights", "capacity": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "offering create failed: {body}");
    body["offering_id"].as_str().unwrap().parse().unwrap()
  }

  // ── Identity ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_identity_headers_are_rejected() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/offerings", None, Some(json!({ "title": "x", "capacity": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-subject-id"));
  }

  #[tokio::test]
  async fn garbage_role_header_is_rejected() {
    let app = app().await;
    let req = Request::builder()
      .method("GET")
      .uri(format!("/subjects/{}/enrollments", Uuid::new_v4()))
      .header("x-subject-id", Uuid::new_v4().to_string())
      .header("x-role", "superuser")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Offerings ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn offerings_are_public_to_read_but_admin_to_create() {
    let app = app().await;
    let admin = admin();
    let id = create_offering(&app, &admin, 10).await;

    // Reads need no identity at all.
    let (status, body) = send(&app, "GET", &format!("/offerings/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 10);
    assert_eq!(body["occupancy"], 0);
    assert_eq!(body["status"], "active");

    let (status, _) = send(
      &app,
      "POST",
      "/offerings",
      Some(&student()),
      Some(json!({ "title": "x", "capacity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn unknown_offering_is_404() {
    let app = app().await;
    let (status, _) =
      send(&app, "GET", &format!("/offerings/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn capacity_cannot_shrink_below_occupancy() {
    let app = app().await;
    let admin = admin();
    let id = create_offering(&app, &admin, 3).await;
    for _ in 0..2 {
      let actor = student();
      let (status, _) = send(
        &app,
        "POST",
        "/enrollments",
        Some(&actor),
        Some(json!({ "offering_id": id })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
      &app,
      "PUT",
      &format!("/offerings/{id}/capacity"),
      Some(&admin),
      Some(json!({ "capacity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  // ── Enrollments ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn student_enrollment_is_created_pending() {
    let app = app().await;
    let id = create_offering(&app, &admin(), 5).await;
    let actor = student();

    let (status, body) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&actor),
      Some(json!({ "offering_id": id, "remarks": "prefers weekends" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["subject_id"], actor.subject_id.to_string());
    assert_eq!(body["remarks"], "prefers weekends");

    let (status, snap) =
      send(&app, "GET", &format!("/offerings/{id}/occupancy"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["occupancy"], 1);
    assert_eq!(snap["capacity"], 5);
  }

  #[tokio::test]
  async fn full_offering_returns_conflict() {
    let app = app().await;
    let id = create_offering(&app, &admin(), 1).await;

    let first = student();
    let (status, _) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&first),
      Some(json!({ "offering_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let second = student();
    let (status, body) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&second),
      Some(json!({ "offering_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("cannot hold more"));
  }

  #[tokio::test]
  async fn student_cannot_enroll_someone_else() {
    let app = app().await;
    let id = create_offering(&app, &admin(), 5).await;

    let (status, _) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&student()),
      Some(json!({ "offering_id": id, "subject_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn cancel_is_idempotent_over_http() {
    let app = app().await;
    let id = create_offering(&app, &admin(), 5).await;
    let actor = student();

    let (_, created) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&actor),
      Some(json!({ "offering_id": id })),
    )
    .await;
    let enrollment_id = created["enrollment_id"].as_str().unwrap().to_owned();

    for _ in 0..2 {
      let (status, body) = send(
        &app,
        "POST",
        &format!("/enrollments/{enrollment_id}/cancel"),
        Some(&actor),
        None,
      )
      .await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body["status"], "cancelled");
      assert_eq!(body["rejection_count"], 1);
    }

    let (_, snap) = send(&app, "GET", &format!("/offerings/{id}/occupancy"), None, None).await;
    assert_eq!(snap["occupancy"], 0);
  }

  #[tokio::test]
  async fn invalid_transition_is_unprocessable() {
    let app = app().await;
    let admin = admin();
    let id = create_offering(&app, &admin, 5).await;
    let actor = student();

    let (_, created) = send(
      &app,
      "POST",
      "/enrollments",
      Some(&actor),
      Some(json!({ "offering_id": id })),
    )
    .await;
    let enrollment_id = created["enrollment_id"].as_str().unwrap().to_owned();

    send(&app, "POST", &format!("/enrollments/{enrollment_id}/cancel"), Some(&actor), None)
      .await;

    let (status, _) = send(
      &app,
      "POST",
      &format!("/enrollments/{enrollment_id}/status"),
      Some(&admin),
      Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Subjects ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn subject_cascade_reports_the_outcome() {
    let app = app().await;
    let admin = admin();
    let o1 = create_offering(&app, &admin, 5).await;
    let o2 = create_offering(&app, &admin, 5).await;
    let actor = student();

    for offering in [o1, o2] {
      let (status, _) = send(
        &app,
        "POST",
        "/enrollments",
        Some(&actor),
        Some(json!({ "offering_id": offering })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    // Students cannot cascade anyone, not even themselves.
    let (status, _) = send(
      &app,
      "DELETE",
      &format!("/subjects/{}", actor.subject_id),
      Some(&actor),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, outcome) = send(
      &app,
      "DELETE",
      &format!("/subjects/{}", actor.subject_id),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["removed_enrollments"], 2);

    for offering in [o1, o2] {
      let (_, snap) =
        send(&app, "GET", &format!("/offerings/{offering}/occupancy"), None, None).await;
      assert_eq!(snap["occupancy"], 0);
    }
  }
}
