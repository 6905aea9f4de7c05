//! Core types and trait definitions for the Rollcall enrollment service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod auth;
pub mod enrollment;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod offering;
pub mod registrar;
pub mod store;
pub mod transition;

pub use error::{Error, Result};
pub use registrar::Registrar;
