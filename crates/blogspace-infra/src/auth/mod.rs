//! Auth service implementations and the session fan-out they share.

mod broadcast;

pub use broadcast::SessionBroadcaster;

#[cfg(feature = "http")]
mod rest;
#[cfg(feature = "http")]
pub use rest::RestAuthService;

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "memory")]
mod password;
#[cfg(feature = "memory")]
pub use memory::InMemoryAuthService;

use std::sync::Arc;

use tokio::sync::RwLock;

use blogspace_core::domain::Session;

/// Current session, shared between an auth service and the data client
/// that signs requests with its access token.
pub type SessionStore = Arc<RwLock<Option<Session>>>;

pub fn new_session_store() -> SessionStore {
    Arc::new(RwLock::new(None))
}
