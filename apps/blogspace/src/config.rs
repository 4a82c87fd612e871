//! Application configuration loaded from environment variables.

use std::env;

use blogspace_infra::BackendConfig;

/// Fatal configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing backend environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let url = required("SUPABASE_URL")?;
        let anon_key = required("SUPABASE_ANON_KEY")?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                name: "SUPABASE_URL",
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }

        Ok(Self {
            backend: BackendConfig::new(url, anon_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_loads_backend_settings() {
        let config = load(&[
            ("SUPABASE_URL", "https://demo.example.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        assert_eq!(config.backend.url, "https://demo.example.co");
        assert_eq!(config.backend.anon_key, "anon");
    }

    #[test]
    fn test_missing_values_are_fatal() {
        assert!(matches!(
            load(&[("SUPABASE_ANON_KEY", "anon")]),
            Err(ConfigError::Missing("SUPABASE_URL"))
        ));
        assert!(matches!(
            load(&[("SUPABASE_URL", "https://x.co"), ("SUPABASE_ANON_KEY", "  ")]),
            Err(ConfigError::Missing("SUPABASE_ANON_KEY"))
        ));
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            load(&[("SUPABASE_URL", "demo.example.co"), ("SUPABASE_ANON_KEY", "anon")]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
