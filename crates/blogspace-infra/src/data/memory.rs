//! In-memory data client.
//!
//! Stands in for the hosted backend when no network is wanted. It applies
//! the backend's server-side rules that the application relies on: id and
//! timestamp defaults, column defaults, the posts-to-blogs foreign key and
//! cascading blog deletes.
//! Note: Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use uuid::Uuid;

use blogspace_core::error::RepoError;
use blogspace_core::ports::{DataClient, Direction, Filter, Query, Table};

/// In-memory tables keyed by collection.
pub struct InMemoryDataClient {
    store: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    tables: HashMap<Table, Vec<Value>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Store {
    /// Insert timestamps strictly increase so "newest first" is total.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if last >= now => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl InMemoryDataClient {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }

    /// Number of rows currently stored in a table.
    pub async fn row_count(&self, table: Table) -> usize {
        self.store.read().await.tables.get(&table).map_or(0, Vec::len)
    }

    fn column_defaults(table: Table) -> Value {
        match table {
            Table::Profiles => json!({ "email": "", "display_name": "", "bio": "", "avatar_url": "" }),
            Table::Blogs => json!({ "description": "" }),
            Table::Posts => json!({
                "content": "",
                "excerpt": "",
                "published": false,
                "published_at": null,
            }),
        }
    }
}

impl Default for InMemoryDataClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Text form of a cell, as the REST filter syntax compares it.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        row.get(filter.column)
            .is_some_and(|cell| cell_text(cell) == filter.value)
    })
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (parse_timestamp(a), parse_timestamp(b)) {
        return x.cmp(&y);
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

/// Order rows the way the backend does: nulls first when descending,
/// last when ascending.
fn sort_rows(rows: &mut [Value], column: &str, direction: Direction) {
    rows.sort_by(|a, b| {
        let a = a.get(column).unwrap_or(&Value::Null);
        let b = b.get(column).unwrap_or(&Value::Null);
        let ordering = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_cells(a, b),
        };
        match direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });
}

fn as_object(row: Value) -> Result<Map<String, Value>, RepoError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(RepoError::Decode(format!("expected a JSON object, got {other}"))),
    }
}

#[async_trait]
impl DataClient for InMemoryDataClient {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, RepoError> {
        let store = self.store.read().await;
        let tables = &store.tables;

        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, direction)) = query.order {
            sort_rows(&mut rows, column, direction);
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if let Some(embed) = &query.embed {
            let parents = tables.get(&embed.table);
            for row in &mut rows {
                let parent = row
                    .get(embed.foreign_key)
                    .and_then(|key| {
                        parents?
                            .iter()
                            .find(|p| p.get("id").is_some_and(|id| id == key))
                    })
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Value::Object(map) = row {
                    map.insert(embed.alias.to_string(), parent);
                }
            }
        }

        tracing::debug!(table = %table, rows = rows.len(), "In-memory select");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RepoError> {
        let mut store = self.store.write().await;
        let now = serde_json::to_value(store.stamp())?;
        let tables = &mut store.tables;

        let mut stored = as_object(Self::column_defaults(table))?;
        stored.insert("id".to_string(), json!(Uuid::new_v4()));
        stored.insert("created_at".to_string(), now.clone());
        stored.insert("updated_at".to_string(), now);
        stored.extend(as_object(row)?);
        let stored = Value::Object(stored);

        let existing = tables.entry(table).or_default();
        if existing.iter().any(|r| r.get("id") == stored.get("id")) {
            return Err(RepoError::Constraint(format!(
                "duplicate key value violates unique constraint \"{table}_pkey\""
            )));
        }

        if table == Table::Posts {
            let blog_exists = tables.get(&Table::Blogs).is_some_and(|blogs| {
                blogs
                    .iter()
                    .any(|b| b.get("id").is_some() && b.get("id") == stored.get("blog_id"))
            });
            if !blog_exists {
                return Err(RepoError::Constraint(
                    "insert on table \"posts\" violates foreign key constraint \"posts_blog_id_fkey\""
                        .to_string(),
                ));
            }
        }

        tables.entry(table).or_default().push(stored.clone());
        tracing::debug!(table = %table, id = ?stored.get("id"), "In-memory insert");
        Ok(stored)
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
        let patch = as_object(patch)?;
        let mut store = self.store.write().await;
        let tables = &mut store.tables;

        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !matches(row, filters) {
                continue;
            }
            if let Value::Object(map) = row {
                for (key, value) in &patch {
                    map.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RepoError> {
        if filters.is_empty() {
            return Err(RepoError::Query("refusing to delete without a filter".to_string()));
        }
        let mut store = self.store.write().await;
        let tables = &mut store.tables;

        let mut removed = HashSet::new();
        tables.entry(table).or_default().retain(|row| {
            if matches(row, filters) {
                removed.insert(row.get("id").map(cell_text).unwrap_or_default());
                false
            } else {
                true
            }
        });

        // on delete cascade
        if table == Table::Blogs && !removed.is_empty() {
            if let Some(posts) = tables.get_mut(&Table::Posts) {
                posts.retain(|post| {
                    post.get("blog_id")
                        .map(cell_text)
                        .is_none_or(|blog_id| !removed.contains(&blog_id))
                });
            }
        }

        tracing::debug!(table = %table, removed = removed.len(), "In-memory delete");
        Ok(())
    }
}
