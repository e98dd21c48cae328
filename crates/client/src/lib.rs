//! `assetctl-client`: control layer of the asset inventory client.
//!
//! Three pieces cooperate:
//! - [`resolver`] classifies the start location once at boot
//! - [`session`] owns who is signed in and which view is showing
//! - [`gateway`] sends every request, stamped with the current identity
//!
//! [`AssetClient`] wires them together in boot order.

pub mod client;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod gateway;
pub mod location;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod types;

pub use client::AssetClient;
pub use config::{ClientConfig, ConfigError, StalePolicy};
pub use context::{AuthContext, AuthSnapshot};
pub use dashboard::{DashboardSummary, EntityCounts, load_summary};
pub use gateway::{ApiRequest, Gateway, RequestBody, Resource};
pub use location::{Location, MemoryLocation};
pub use resolver::{RouteInfo, resolve};
pub use session::{Session, SessionError, SessionState, Universe, View};
pub use storage::{FileStore, MemoryStore, SessionStore, StorageError};
pub use types::{
    Entity, EquipoEnums, EquipoFilter, ListQuery, ReportFormat, ResponsableFilter, TextFilter,
    UploadFile, UploadedFile, UsuarioEnums, UsuarioFilter,
};

pub use assetctl_auth::{Action, Capabilities, ClientKind, Role, User};
pub use assetctl_core::{ErrorKind, RecordId, ServiceError, ServiceResult, UserId};
