//! REST data client for the hosted backend.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use blogspace_core::error::RepoError;
use blogspace_core::ports::{DataClient, Filter, Query, Table};
use blogspace_shared::ErrorBody;

use crate::auth::SessionStore;
use crate::config::BackendConfig;

/// Data client speaking the backend's REST dialect.
///
/// Requests carry the signed-in user's access token so row-level security
/// applies; without a session the anon key is used.
pub struct RestDataClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    session: SessionStore,
}

impl RestDataClient {
    pub fn new(config: &BackendConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            session,
        }
    }

    async fn request(&self, method: Method, table: Table) -> RequestBuilder {
        let bearer = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());

        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, table: Table, request: RequestBuilder) -> Result<String, RepoError> {
        let response = request
            .send()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        if status.is_success() {
            return Ok(text);
        }

        let body = ErrorBody::parse(&text);
        tracing::debug!(
            table = %table,
            status = status.as_u16(),
            code = ?body.code(),
            "Backend rejected request"
        );
        Err(map_error(status, &body))
    }
}

/// Translate a non-success response into a repository error.
pub(crate) fn map_error(status: StatusCode, body: &ErrorBody) -> RepoError {
    let message = body.summary();
    match body.code().as_deref() {
        Some("23505") => RepoError::Constraint(message),
        Some("23503") => RepoError::Constraint(message),
        Some("42501") => RepoError::Forbidden(message),
        Some("PGRST116") => RepoError::NotFound,
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            RepoError::Forbidden(message)
        }
        _ if status == StatusCode::NOT_FOUND => RepoError::NotFound,
        _ => RepoError::Query(message),
    }
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_param).collect()
}

fn parse_rows(text: &str) -> Result<Vec<Value>, RepoError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl DataClient for RestDataClient {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, RepoError> {
        tracing::debug!(table = %table, params = ?query.to_params(), "Selecting rows");

        let request = self
            .request(Method::GET, table)
            .await
            .query(&query.to_params());
        let text = self.send(table, request).await?;
        parse_rows(&text)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RepoError> {
        tracing::debug!(table = %table, "Inserting row");

        let request = self
            .request(Method::POST, table)
            .await
            .header("Prefer", "return=representation")
            .json(&row);
        let text = self.send(table, request).await?;

        parse_rows(&text)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Decode("insert returned no row".to_string()))
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, RepoError> {
        if filters.is_empty() {
            return Err(RepoError::Query("refusing to update without a filter".to_string()));
        }
        tracing::debug!(table = %table, filters = ?filters, "Updating rows");

        let request = self
            .request(Method::PATCH, table)
            .await
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        let text = self.send(table, request).await?;
        parse_rows(&text)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RepoError> {
        if filters.is_empty() {
            return Err(RepoError::Query("refusing to delete without a filter".to_string()));
        }
        tracing::debug!(table = %table, filters = ?filters, "Deleting rows");

        let request = self
            .request(Method::DELETE, table)
            .await
            .query(&filter_params(filters));
        self.send(table, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_unique_violation() {
        let body = ErrorBody::parse(r#"{"code":"23505","message":"duplicate key"}"#);
        assert!(matches!(
            map_error(StatusCode::CONFLICT, &body),
            RepoError::Constraint(_)
        ));
    }

    #[test]
    fn test_map_row_level_security() {
        let body = ErrorBody::parse(
            r#"{"code":"42501","message":"new row violates row-level security policy"}"#,
        );
        assert!(matches!(
            map_error(StatusCode::FORBIDDEN, &body),
            RepoError::Forbidden(_)
        ));
    }

    #[test]
    fn test_map_unauthorized_status() {
        let body = ErrorBody::parse(r#"{"message":"JWT expired"}"#);
        match map_error(StatusCode::UNAUTHORIZED, &body) {
            RepoError::Forbidden(msg) => assert_eq!(msg, "JWT expired"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_map_other_errors_to_query() {
        let body = ErrorBody::parse(r#"{"code":"22P02","message":"invalid input syntax for type uuid"}"#);
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, &body),
            RepoError::Query(_)
        ));
    }

    #[test]
    fn test_parse_rows_accepts_empty_body() {
        assert!(parse_rows("").unwrap().is_empty());
        assert_eq!(parse_rows(r#"[{"id":1}]"#).unwrap().len(), 1);
    }
}
