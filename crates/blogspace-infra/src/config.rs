//! Connection settings for the hosted backend.

/// Project URL and public (anon) key.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Base URL of the REST endpoints.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Base URL of the auth endpoints.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }
}
