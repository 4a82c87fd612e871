//! Authentication port.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::{AuthEvent, Session, SignUpOutcome};

/// Handle returned by [`AuthService::on_auth_state_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handler invoked on every session transition.
pub type AuthChangeHandler = Box<
    dyn Fn(AuthEvent, Option<Session>) -> Pin<Box<dyn Future<Output = ()> + Send>>
        + Send
        + Sync,
>;

/// Auth service - session management owned by the hosted backend.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    /// Create an account; the display name travels as user metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, AuthError>;

    /// End the session. The local session is cleared even when the
    /// backend call fails.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Register a handler for session transitions.
    async fn on_auth_state_change(
        &self,
        handler: AuthChangeHandler,
    ) -> Result<SubscriptionId, AuthError>;

    async fn unsubscribe(&self, id: SubscriptionId);
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("User already registered")]
    UserAlreadyExists,

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth backend error: {0}")]
    Backend(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
