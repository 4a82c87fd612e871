//! # BlogSpace Infrastructure
//!
//! Concrete implementations of the ports defined in `blogspace-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `http` - REST data client and auth client for the hosted backend
//! - `memory` - Local accounts for the in-process backend

pub mod auth;
pub mod config;
pub mod data;
pub mod repository;

pub use auth::{SessionBroadcaster, SessionStore};
pub use config::BackendConfig;
pub use data::InMemoryDataClient;
pub use repository::DataRepository;

#[cfg(feature = "http")]
pub use auth::RestAuthService;
#[cfg(feature = "http")]
pub use data::RestDataClient;

#[cfg(feature = "memory")]
pub use auth::InMemoryAuthService;
