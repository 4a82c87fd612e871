//! In-memory auth service.
//!
//! Local accounts with Argon2-hashed passwords. Sign-up also writes the
//! account's profile row, as the hosted backend's trigger would.
//! Note: Accounts are lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use blogspace_core::domain::{AuthEvent, AuthUser, Session, SignUpOutcome};
use blogspace_core::ports::{
    AuthChangeHandler, AuthError, AuthService, DataClient, SubscriptionId, Table,
};

use super::password::CredentialHasher;
use super::{SessionBroadcaster, SessionStore, new_session_store};

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_HOURS: i64 = 1;

struct Account {
    user: AuthUser,
    password_hash: String,
}

pub struct InMemoryAuthService {
    accounts: Mutex<HashMap<String, Account>>,
    session: SessionStore,
    events: SessionBroadcaster,
    hasher: CredentialHasher,
    data: Arc<dyn DataClient>,
}

impl InMemoryAuthService {
    pub fn new(data: Arc<dyn DataClient>) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: new_session_store(),
            events: SessionBroadcaster::default(),
            hasher: CredentialHasher::new(),
            data,
        }
    }

    /// End the current session from outside this client, as a sign-out in
    /// another window or an admin revocation would.
    pub async fn revoke(&self) {
        if self.session.write().await.take().is_some() {
            tracing::info!("Session revoked");
            self.events.emit(AuthEvent::SignedOut, None);
        }
    }

    async fn open_session(&self, user: AuthUser) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now() + TimeDelta::hours(SESSION_HOURS),
            user,
        };
        *self.session.write().await = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn, Some(session.clone()));
        session
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let mut current = self.session.write().await;
        let Some(session) = current.as_mut() else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            session.access_token = Uuid::new_v4().to_string();
            session.issued_at = Utc::now();
            session.expires_at = session.issued_at + TimeDelta::hours(SESSION_HOURS);
            self.events.emit(AuthEvent::TokenRefreshed, Some(session.clone()));
        }
        Ok(Some(session.clone()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let user = {
            let accounts = self.accounts.lock().await;
            let account = accounts
                .get(&account_key(email))
                .ok_or(AuthError::InvalidCredentials)?;

            if !self.hasher.verify(password, &account.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            account.user.clone()
        };

        tracing::info!(user_id = %user.id, "Signed in");
        Ok(self.open_session(user).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let key = account_key(email);
        if !key.contains('@') {
            return Err(AuthError::Backend("Unable to validate email address".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let user = {
            let mut accounts = self.accounts.lock().await;
            if accounts.contains_key(&key) {
                return Err(AuthError::UserAlreadyExists);
            }

            let user = AuthUser {
                id: Uuid::new_v4(),
                email: key.clone(),
            };
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password_hash: self.hasher.hash(password)?,
                },
            );
            user
        };

        self.data
            .insert(
                Table::Profiles,
                json!({
                    "id": user.id,
                    "email": user.email,
                    "display_name": display_name,
                }),
            )
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Account created");
        Ok(SignUpOutcome::SignedIn(self.open_session(user).await))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.session.write().await.take() {
            tracing::info!(user_id = %session.user.id, "Signed out");
            self.events.emit(AuthEvent::SignedOut, None);
        }
        Ok(())
    }

    async fn on_auth_state_change(
        &self,
        handler: AuthChangeHandler,
    ) -> Result<SubscriptionId, AuthError> {
        let current = self.session.read().await.clone();
        Ok(self.events.subscribe(handler, current).await)
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id).await;
    }
}
