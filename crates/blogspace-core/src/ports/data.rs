//! Table-scoped data access.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RepoError;

/// Collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Blogs,
    Posts,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Blogs => "blogs",
            Table::Posts => "posts",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// Encode as a `column=eq.value` query parameter.
    pub fn to_param(&self) -> (String, String) {
        (self.column.to_string(), format!("eq.{}", self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Parent row embedded under `alias`, joined on `foreign_key = parent.id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: &'static str,
    pub table: Table,
    pub foreign_key: &'static str,
}

/// Select query: filters, one ordering, an optional limit and embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(&'static str, Direction)>,
    pub limit: Option<usize>,
    pub embed: Option<Embed>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some((column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn embed(mut self, alias: &'static str, table: Table, foreign_key: &'static str) -> Self {
        self.embed = Some(Embed {
            alias,
            table,
            foreign_key,
        });
        self
    }

    /// Encode as REST query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = match &self.embed {
            Some(embed) => format!("*,{}:{}(*)", embed.alias, embed.table),
            None => "*".to_string(),
        };

        let mut params = vec![("select".to_string(), select)];
        params.extend(self.filters.iter().map(Filter::to_param));

        if let Some((column, direction)) = self.order {
            let dir = match direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{column}.{dir}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Data client - row-level access to the backend's collections.
///
/// Rows travel as JSON objects; typed repositories sit on top.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Select rows matching the query.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, RepoError>;

    /// Insert a row and return it as stored.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, RepoError>;

    /// Patch every row matching the filters and return the updated rows.
    async fn update(&self, table: Table, filters: &[Filter], patch: Value)
    -> Result<Vec<Value>, RepoError>;

    /// Delete every row matching the filters.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_recent_posts() {
        let params = Query::new()
            .embed("blog", Table::Blogs, "blog_id")
            .eq("published", true)
            .order("published_at", Direction::Descending)
            .limit(9)
            .to_params();

        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*,blog:blogs(*)".to_string()),
                ("published".to_string(), "eq.true".to_string()),
                ("order".to_string(), "published_at.desc".to_string()),
                ("limit".to_string(), "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_plain_select() {
        let params = Query::new().eq("id", 7).to_params();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert_eq!(params[1], ("id".to_string(), "eq.7".to_string()));
    }
}
