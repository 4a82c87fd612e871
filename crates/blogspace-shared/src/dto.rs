//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /auth/v1/token?grant_type=password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/v1/token?grant_type=refresh_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshGrant {
    pub refresh_token: String,
}

/// Metadata stored on the account at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of `POST /auth/v1/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: UserMetadata,
}

/// Account as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Session issued by the token and signup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Unix seconds; older backends omit it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: UserBody,
}

/// Signup answers with a session when accounts are auto-confirmed and with
/// the bare account when email confirmation is pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenResponse),
    User(UserBody),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_response_with_session() {
        let json = serde_json::json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "r",
            "user": { "id": Uuid::new_v4(), "email": "a@b.c", "user_metadata": { "display_name": "A" } }
        });
        let parsed: SignUpResponse = serde_json::from_value(json).unwrap();
        assert!(matches!(parsed, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_signup_response_pending_confirmation() {
        let json = serde_json::json!({ "id": Uuid::new_v4(), "email": "a@b.c" });
        let parsed: SignUpResponse = serde_json::from_value(json).unwrap();
        match parsed {
            SignUpResponse::User(user) => assert_eq!(user.email.as_deref(), Some("a@b.c")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_signup_request_carries_display_name() {
        let body = SignUpRequest {
            email: "a@b.c".into(),
            password: "secret".into(),
            data: UserMetadata {
                display_name: Some("Ada".into()),
            },
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["data"]["display_name"], "Ada");
    }
}
