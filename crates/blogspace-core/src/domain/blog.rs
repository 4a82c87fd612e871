use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::null_as_empty;
use super::text::slugify;

/// Blog entity - a collection of posts owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a blog. The backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBlog {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

impl NewBlog {
    /// Build the insert payload, deriving the slug from the title.
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            user_id,
            slug: slugify(&title),
            title,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_blog_derives_slug() {
        let blog = NewBlog::new(Uuid::new_v4(), "Daily Notes", "Thoughts");
        assert_eq!(blog.slug, "daily-notes");
        assert_eq!(blog.title, "Daily Notes");
    }

    #[test]
    fn test_blog_reads_null_description() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "title": "T",
            "description": null,
            "slug": "t",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        });
        let blog: Blog = serde_json::from_value(json).unwrap();
        assert_eq!(blog.description, "");
    }
}
