//! SQLite backend for the Rollcall enrollment store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That single serialized
//! connection, plus one `IMMEDIATE` transaction per mutating operation,
//! is the concurrency guard: two callers racing for the last slot of an
//! offering cannot both observe it free.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
