//! Error type for `rollcall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollcall_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown status value in database: {0:?}")]
  StatusParse(String),
}

/// Business errors raised inside a `conn.call` closure travel out
/// through [`tokio_rusqlite::Error::Other`]; unwrap them back into
/// their own variants so callers can match on the domain taxonomy.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(inner) => {
        match inner.downcast::<rollcall_core::Error>() {
          Ok(core) => Error::Core(*core),
          Err(other) => match other.downcast::<Error>() {
            Ok(store) => *store,
            Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
          },
        }
      }
      other => Error::Database(other),
    }
  }
}

/// Lets the store satisfy the `EnrollmentStore::Error: Into<_>` bound:
/// business errors pass through, everything else becomes an opaque
/// storage failure.
impl From<Error> for rollcall_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => rollcall_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
