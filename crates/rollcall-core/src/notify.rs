//! Outbound notification interface.
//!
//! Delivery (email, in-app, whatever) is an external collaborator.
//! Notifications are best-effort and fire after commit: a sink failure
//! must never roll back a committed transition, so `notify` cannot
//! return an error at all.

use std::future::Future;

use uuid::Uuid;

/// What a notification is about — a tagged reference instead of a
/// string discriminator plus an untyped id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedEntity {
  Offering(Uuid),
  Enrollment(Uuid),
  Subject(Uuid),
}

/// A best-effort notification sink.
pub trait NotificationSink: Send + Sync {
  /// Deliver `message` to `recipient` (`None` addresses operators /
  /// administrators). Implementations swallow and log their own
  /// failures.
  fn notify<'a>(
    &'a self,
    recipient: Option<Uuid>,
    message: &'a str,
    related: RelatedEntity,
  ) -> impl Future<Output = ()> + Send + 'a;
}

/// A sink that drops everything. Useful in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
  async fn notify(&self, _recipient: Option<Uuid>, _message: &str, _related: RelatedEntity) {}
}
