//! Ports - trait definitions for the hosted backend.
//! These are the interfaces that infrastructure must implement.

mod auth;
mod data;
mod repository;

pub use auth::{AuthChangeHandler, AuthError, AuthService, SubscriptionId};
pub use data::{DataClient, Direction, Embed, Filter, Query, Table};
pub use repository::{BlogRepository, PostRepository, ProfileRepository};
