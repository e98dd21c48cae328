//! `assetctl-core`: shared building blocks for the inventory client.
//!
//! This crate holds the canonical failure shape of every remote call and the
//! identifiers the remote service hands out. It has no I/O.

pub mod error;
pub mod id;

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use id::{RecordId, UserId};
