//! Auth client for the hosted backend's auth endpoints.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use blogspace_core::domain::{AuthEvent, AuthUser, Session, SignUpOutcome};
use blogspace_core::ports::{AuthChangeHandler, AuthError, AuthService, SubscriptionId};
use blogspace_shared::ErrorBody;
use blogspace_shared::dto::{
    PasswordGrant, RefreshGrant, SignUpRequest, SignUpResponse, TokenResponse, UserBody,
    UserMetadata,
};

use super::{SessionBroadcaster, SessionStore};
use crate::config::BackendConfig;

/// Password-based auth against the backend.
///
/// The session lives in process memory and is shared with the REST data
/// client through the [`SessionStore`].
pub struct RestAuthService {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    session: SessionStore,
    events: SessionBroadcaster,
}

impl RestAuthService {
    pub fn new(config: &BackendConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
            session,
            events: SessionBroadcaster::default(),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        if !status.is_success() {
            return Err(map_auth_error(status, &ErrorBody::parse(&text)));
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Backend(e.to_string()))
    }

    async fn open_session(&self, token: TokenResponse, event: AuthEvent) -> Session {
        let session = session_from_token(token, Utc::now());
        *self.session.write().await = Some(session.clone());
        self.events.emit(event, Some(session.clone()));
        session
    }

    async fn refresh(&self, refresh_token: String) -> Result<Session, AuthError> {
        let token: TokenResponse = self
            .post("token?grant_type=refresh_token", &RefreshGrant { refresh_token })
            .await?;
        Ok(self.open_session(token, AuthEvent::TokenRefreshed).await)
    }
}

fn auth_user(user: UserBody) -> AuthUser {
    AuthUser {
        id: user.id,
        email: user.email.unwrap_or_default(),
    }
}

/// Build a session from a token response, preferring the absolute expiry.
pub(crate) fn session_from_token(token: TokenResponse, now: DateTime<Utc>) -> Session {
    let expires_at = token
        .expires_at
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(|| now + TimeDelta::seconds(token.expires_in));

    Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        issued_at: now,
        expires_at,
        user: auth_user(token.user),
    }
}

/// Translate an auth endpoint failure.
pub(crate) fn map_auth_error(status: StatusCode, body: &ErrorBody) -> AuthError {
    let code = body
        .error_code
        .as_deref()
        .or(body.error.as_deref())
        .unwrap_or_default();

    match code {
        "invalid_grant" | "invalid_credentials" => AuthError::InvalidCredentials,
        "user_already_exists" | "email_exists" => AuthError::UserAlreadyExists,
        "weak_password" => AuthError::WeakPassword(body.summary()),
        _ if body.summary() == "User already registered" => AuthError::UserAlreadyExists,
        _ if status == StatusCode::UNAUTHORIZED => AuthError::NotSignedIn,
        _ => AuthError::Backend(format!("{}: {}", status.as_u16(), body.summary())),
    }
}

#[async_trait]
impl AuthService for RestAuthService {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        tracing::debug!(user_id = %session.user.id, "Session expired, refreshing");
        match self.refresh(session.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, signing out locally");
                *self.session.write().await = None;
                self.events.emit(AuthEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let grant = PasswordGrant {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self.post("token?grant_type=password", &grant).await?;
        let session = self.open_session(token, AuthEvent::SignedIn).await;

        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: UserMetadata {
                display_name: Some(display_name.to_string()),
            },
        };

        match self.post("signup", &request).await? {
            SignUpResponse::Session(token) => {
                let session = self.open_session(token, AuthEvent::SignedIn).await;
                tracing::info!(user_id = %session.user.id, "Account created and signed in");
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "Account created, confirmation pending");
                Ok(SignUpOutcome::ConfirmationRequired {
                    user: auth_user(user),
                })
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };
        self.events.emit(AuthEvent::SignedOut, None);

        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        let status = response.status();
        // An already-invalid token means the session is gone anyway.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            tracing::info!(user_id = %session.user.id, "Signed out");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(map_auth_error(status, &ErrorBody::parse(&text)))
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
