//! Editor - writes a new post or edits an existing one.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use blogspace_core::DomainError;
use blogspace_core::domain::{AuthUser, NewPost, PostChanges};
use blogspace_core::ports::PostRepository;

use super::{discard, report, write_error};
use crate::lifecycle::MountToken;
use crate::router::{Navigation, Page};

pub struct EditorPage {
    posts: Arc<dyn PostRepository>,
    user: Option<AuthUser>,
    blog_id: Option<Uuid>,
    post_id: Option<Uuid>,
    token: MountToken,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub saving: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl EditorPage {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        user: Option<AuthUser>,
        blog_id: Option<Uuid>,
        post_id: Option<Uuid>,
        token: MountToken,
    ) -> Self {
        Self {
            posts,
            user,
            blog_id,
            post_id,
            token,
            title: String::new(),
            content: String::new(),
            excerpt: String::new(),
            saving: false,
            last_saved: None,
            error: None,
        }
    }

    /// The post being edited; set once a new post has been saved.
    #[cfg(test)]
    pub fn post_id(&self) -> Option<Uuid> {
        self.post_id
    }

    /// Seed the fields from the post being edited. Starts blank otherwise.
    pub async fn load(&mut self) {
        let Some(post_id) = self.post_id else {
            return;
        };

        let result = self.posts.find_by_id(post_id).await;
        if !self.token.is_live() {
            return discard("editor", "post");
        }

        match result {
            Ok(Some(post)) => {
                self.title = post.title;
                self.content = post.content;
                self.excerpt = post.excerpt;
                self.error = None;
            }
            Ok(None) => {
                let missing = DomainError::NotFound {
                    entity_type: "post",
                    id: post_id,
                };
                self.error = Some(report("editor", "load post", &missing));
            }
            Err(e) => self.error = Some(report("editor", "load post", &e)),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[cfg(test)]
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn append_content(&mut self, line: &str) {
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        self.content.push_str(line);
    }

    pub fn set_excerpt(&mut self, excerpt: impl Into<String>) {
        self.excerpt = excerpt.into();
    }

    /// Saving is disabled while a save is in flight.
    pub fn can_save(&self) -> bool {
        !self.saving
    }

    /// Update the post being edited, or insert a new one into the blog.
    pub async fn save(&mut self) {
        if !self.can_save() {
            return;
        }
        self.saving = true;
        let saved = self.persist().await;
        if !self.token.is_live() {
            return discard("editor", "save");
        }
        self.saving = false;

        match saved {
            Ok(post_id) => {
                tracing::info!(post_id = %post_id, "Post saved");
                self.post_id = Some(post_id);
                self.last_saved = Some(Utc::now());
                self.error = None;
            }
            Err(e) => self.error = Some(report("editor", "save post", &e)),
        }
    }

    async fn persist(&self) -> Result<Uuid, DomainError> {
        if let Some(post_id) = self.post_id {
            let changes = PostChanges::from_draft(&self.title, &self.content, &self.excerpt, Utc::now());
            return Ok(self.posts.update_content(post_id, changes).await?.id);
        }

        let user = self.user.as_ref().ok_or(DomainError::Unauthorized)?;
        let blog_id = self
            .blog_id
            .ok_or_else(|| DomainError::Validation("choose a blog before writing a post".to_string()))?;

        let post = NewPost::from_draft(blog_id, user.id, &self.title, &self.content, &self.excerpt);
        Ok(self.posts.insert(post).await?.id)
    }

    pub fn back(&self) -> Navigation {
        Navigation::to(Page::Dashboard)
    }
}

impl fmt::Display for EditorPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = if self.post_id.is_some() { "Edit Post" } else { "New Post" };
        write!(f, "<- Back to Dashboard   {heading}")?;
        if self.saving {
            write!(f, "   Saving...")?;
        } else if let Some(at) = &self.last_saved {
            write!(f, "   Saved {}", at.with_timezone(&Local).format("%-I:%M:%S %p"))?;
        }
        writeln!(f)?;
        write_error(f, &self.error)?;
        writeln!(f)?;

        let title = if self.title.is_empty() { "Post title..." } else { &self.title };
        writeln!(f, "# {title}")?;
        if !self.excerpt.is_empty() {
            writeln!(f, "> {}", self.excerpt)?;
        }
        writeln!(f)?;
        if self.content.is_empty() {
            writeln!(f, "Start writing your post...")
        } else {
            writeln!(f, "{}", self.content)
        }
    }
}
