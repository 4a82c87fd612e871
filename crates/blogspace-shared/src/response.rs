//! Error bodies returned by the hosted backend.

use serde::{Deserialize, Serialize};

/// Error body from either the REST or the auth endpoints.
///
/// The REST layer sends `code`/`message`/`details`/`hint`; the auth layer
/// sends `error`/`error_description` or `msg`/`error_code`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// Parse a response body, falling back to the raw text as the message.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            message: (!text.is_empty()).then(|| text.to_string()),
            ..Self::default()
        })
    }

    /// Error code as text. The REST layer sends strings, the auth layer
    /// sometimes sends the HTTP status as a number.
    pub fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => self.error_code.clone(),
        }
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        self.message
            .as_ref()
            .or(self.error_description.as_ref())
            .or(self.msg.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rest_error() {
        let body = ErrorBody::parse(
            r#"{"code":"23505","message":"duplicate key value violates unique constraint","details":null,"hint":null}"#,
        );
        assert_eq!(body.code().as_deref(), Some("23505"));
        assert!(body.summary().starts_with("duplicate key"));
    }

    #[test]
    fn test_parse_auth_error() {
        let body = ErrorBody::parse(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(body.summary(), "Invalid login credentials");
        assert_eq!(body.error.as_deref(), Some("invalid_grant"));
    }

    #[test]
    fn test_parse_numeric_code() {
        let body = ErrorBody::parse(r#"{"code":422,"error_code":"weak_password","msg":"Password should be at least 6 characters."}"#);
        assert_eq!(body.code().as_deref(), Some("422"));
        assert_eq!(body.summary(), "Password should be at least 6 characters.");
    }

    #[test]
    fn test_parse_plain_text() {
        let body = ErrorBody::parse("Bad Gateway");
        assert_eq!(body.summary(), "Bad Gateway");
    }
}
