//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business rule failures detected on the client.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Errors returned by the data backend.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Backend connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Malformed row: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Decode(err.to_string())
    }
}
