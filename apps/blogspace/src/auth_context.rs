//! Auth context - the signed-in user and profile, shared with every view.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, watch};

use blogspace_core::domain::{AuthUser, Profile, Session, SignUpOutcome};
use blogspace_core::ports::{AuthError, AuthService, ProfileRepository, SubscriptionId};

/// What views see of the auth state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    /// True until the initial session check has completed.
    pub loading: bool,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
        }
    }
}

struct Inner {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileRepository>,
    state: watch::Sender<AuthSnapshot>,
    // Serializes syncs so the last one to finish reflects the latest session.
    sync_lock: Mutex<()>,
}

impl Inner {
    /// Re-read the session from the auth service and publish a snapshot.
    async fn sync(&self) {
        let _guard = self.sync_lock.lock().await;

        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve session");
                None
            }
        };
        let snapshot = self.snapshot_for(session).await;
        self.state.send_replace(snapshot);
    }

    async fn snapshot_for(&self, session: Option<Session>) -> AuthSnapshot {
        let Some(session) = session else {
            return AuthSnapshot {
                user: None,
                profile: None,
                loading: false,
            };
        };

        let profile = match self.profiles.find_by_id(session.user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %session.user.id, error = %e, "Failed to load profile");
                None
            }
        };

        AuthSnapshot {
            user: Some(session.user),
            profile,
            loading: false,
        }
    }
}

/// Explicitly constructed auth context.
///
/// `start` resolves the existing session and subscribes to session
/// changes; `teardown` (or drop) ends the subscription.
pub struct AuthContext {
    inner: Arc<Inner>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl AuthContext {
    pub fn new(auth: Arc<dyn AuthService>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                profiles,
                state: watch::Sender::new(AuthSnapshot::default()),
                sync_lock: Mutex::new(()),
            }),
            subscription: Mutex::new(None),
        }
    }

    /// Resolve the current session and follow session changes.
    pub async fn start(&self) -> Result<(), AuthError> {
        self.inner.sync().await;

        let mut subscription = self.subscription.lock().await;
        if subscription.is_some() {
            return Ok(());
        }

        let inner = Arc::downgrade(&self.inner);
        let id = self
            .inner
            .auth
            .on_auth_state_change(Box::new(move |event, _session| {
                let inner = inner.clone();
                async move {
                    if let Some(inner) = inner.upgrade() {
                        tracing::debug!(event = ?event, "Auth state changed");
                        inner.sync().await;
                    }
                }
                .boxed()
            }))
            .await?;

        *subscription = Some(id);
        tracing::debug!("Auth context started");
        Ok(())
    }

    /// Stop following session changes.
    pub async fn teardown(&self) {
        if let Some(id) = self.subscription.lock().await.take() {
            self.inner.auth.unsubscribe(id).await;
            tracing::debug!("Auth context torn down");
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Receiver that wakes on every auth state change.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.inner.auth.sign_in_with_password(email, password).await?;
        self.inner.sync().await;
        Ok(())
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.inner.auth.sign_up(email, password, display_name).await?;
        self.inner.sync().await;
        Ok(outcome)
    }

    /// Sign out. The local state is cleared even when the backend call
    /// fails; the error is returned for the caller to log.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.inner.auth.sign_out().await;
        self.inner.sync().await;
        result
    }

    /// Reload the profile after it was edited.
    pub async fn refresh_profile(&self) {
        self.inner.sync().await;
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        let Some(id) = self.subscription.get_mut().take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let auth = self.inner.auth.clone();
            handle.spawn(async move { auth.unsubscribe(id).await });
        }
    }
}
