//! `assetctl-auth`: identity of the signed-in user and what it may do.
//!
//! This crate is intentionally decoupled from HTTP and storage. Role checks
//! here only decide which actions a screen exposes; the remote service
//! re-checks every request on its own.

pub mod authorize;
pub mod headers;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize, capabilities_for};
pub use headers::{AuthHeaders, CLIENT_HEADER, ClientKind, ROLE_HEADER, USER_ID_HEADER};
pub use permissions::{Action, Capabilities};
pub use roles::{Role, RoleParseError};
pub use user::{User, UserRecordError};
