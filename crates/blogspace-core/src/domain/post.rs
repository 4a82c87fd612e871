use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blog::Blog;
use super::null_as_empty;
use super::text::{auto_excerpt, post_slug};

const UNTITLED: &str = "Untitled";

/// Post entity - an article inside a blog.
///
/// `published_at` is set exactly when `published` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// The change that flips this post's publish state.
    pub fn toggled(&self, now: DateTime<Utc>) -> PublishChange {
        PublishChange::set(!self.published, now)
    }
}

/// A published post together with the blog it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithBlog {
    #[serde(flatten)]
    pub post: Post,
    pub blog: Blog,
}

/// Insert payload for a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
}

impl NewPost {
    /// Build an insert payload from the editor fields.
    ///
    /// An empty title is stored as "Untitled"; the slug still comes from
    /// the raw title and falls back to "untitled".
    pub fn from_draft(blog_id: Uuid, user_id: Uuid, title: &str, content: &str, excerpt: &str) -> Self {
        Self {
            blog_id,
            user_id,
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            slug: post_slug(title),
            content: content.to_string(),
            excerpt: auto_excerpt(excerpt, content),
        }
    }
}

/// Content update for an existing post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub updated_at: DateTime<Utc>,
}

impl PostChanges {
    pub fn from_draft(title: &str, content: &str, excerpt: &str, now: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            slug: post_slug(title),
            content: content.to_string(),
            excerpt: auto_excerpt(excerpt, content),
            updated_at: now,
        }
    }
}

/// Publish-state update. `published_at` is always sent, `null` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishChange {
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl PublishChange {
    pub fn set(published: bool, now: DateTime<Utc>) -> Self {
        Self {
            published,
            published_at: published.then_some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(published: bool) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            blog_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "First!".to_string(),
            slug: "first".to_string(),
            content: String::new(),
            excerpt: String::new(),
            published,
            published_at: published.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_toggle_publish_sets_timestamp() {
        let now = Utc::now();
        let change = sample_post(false).toggled(now);
        assert!(change.published);
        assert_eq!(change.published_at, Some(now));
    }

    #[test]
    fn test_toggle_unpublish_clears_timestamp() {
        let change = sample_post(true).toggled(Utc::now());
        assert!(!change.published);
        assert_eq!(change.published_at, None);
    }

    #[test]
    fn test_publish_change_serializes_null() {
        let change = PublishChange::set(false, Utc::now());
        let json = serde_json::to_value(change).unwrap();
        assert!(json["published_at"].is_null());
    }

    #[test]
    fn test_new_post_defaults_title() {
        let post = NewPost::from_draft(Uuid::new_v4(), Uuid::new_v4(), "", "body", "");
        assert_eq!(post.title, "Untitled");
        assert_eq!(post.slug, "untitled");
        assert_eq!(post.excerpt, "body");
    }

    #[test]
    fn test_post_changes_keep_explicit_excerpt() {
        let changes = PostChanges::from_draft("Hello", "<p>body</p>", "Custom", Utc::now());
        assert_eq!(changes.excerpt, "Custom");
        assert_eq!(changes.slug, "hello");
    }

    #[test]
    fn test_post_with_blog_reads_embedded_row() {
        let post = sample_post(true);
        let now = Utc::now();
        let mut json = serde_json::to_value(&post).unwrap();
        json["blog"] = serde_json::json!({
            "id": post.blog_id,
            "user_id": post.user_id,
            "title": "Daily Notes",
            "description": "",
            "slug": "daily-notes",
            "created_at": now,
            "updated_at": now,
        });

        let joined: PostWithBlog = serde_json::from_value(json).unwrap();
        assert_eq!(joined.post, post);
        assert_eq!(joined.blog.title, "Daily Notes");
    }
}
