use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EXPIRY_MARGIN_SECS: i64 = 10;

/// Authenticated account as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Sessions are treated as expired slightly early so a request never
    /// goes out with a token that lapses in flight. The margin is at most
    /// a quarter of the token's lifetime, so a freshly issued short-lived
    /// token is never already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let lifetime = self.expires_at - self.issued_at;
        let margin = TimeDelta::seconds(EXPIRY_MARGIN_SECS).min(lifetime / 4);
        now + margin >= self.expires_at
    }
}

/// Session transitions broadcast to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is active and a session was opened.
    SignedIn(Session),
    /// The backend requires email confirmation before sign-in.
    ConfirmationRequired { user: AuthUser },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            issued_at,
            expires_at,
            user: AuthUser {
                id: Uuid::new_v4(),
                email: "a@b.c".into(),
            },
        }
    }

    #[test]
    fn test_session_expiry_margin() {
        let now = Utc::now();
        let session = session(now - TimeDelta::hours(1), now + TimeDelta::seconds(5));
        assert!(session.is_expired(now));
        assert!(!Session {
            expires_at: now + TimeDelta::hours(1),
            ..session
        }
        .is_expired(now));
    }

    #[test]
    fn test_short_lived_token_is_fresh_when_issued() {
        let now = Utc::now();
        let session = session(now, now + TimeDelta::seconds(8));
        assert!(!session.is_expired(now));
        assert!(!session.is_expired(now + TimeDelta::seconds(5)));
        assert!(session.is_expired(now + TimeDelta::seconds(6)));
    }
}
