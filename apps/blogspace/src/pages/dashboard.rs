//! Dashboard - the signed-in user's blogs and their posts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use blogspace_core::DomainError;
use blogspace_core::domain::{AuthUser, Blog, NewBlog, Post};
use blogspace_core::ports::{BlogRepository, PostRepository};

use super::{discard, report, short_date, write_error};
use crate::lifecycle::MountToken;
use crate::router::{NavData, Navigation, Page};

pub const DELETE_BLOG_PROMPT: &str = "Are you sure? This will delete all posts in this blog.";
pub const DELETE_POST_PROMPT: &str = "Are you sure you want to delete this post?";

/// Interactive yes/no confirmation.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, prompt: &str) -> bool;
}

pub struct DashboardPage {
    blogs_repo: Arc<dyn BlogRepository>,
    posts_repo: Arc<dyn PostRepository>,
    user: Option<AuthUser>,
    token: MountToken,
    pub loading: bool,
    pub blogs: Vec<Blog>,
    pub selected: Option<Uuid>,
    pub posts: Vec<Post>,
    pub error: Option<String>,
}

impl DashboardPage {
    pub fn new(
        blogs_repo: Arc<dyn BlogRepository>,
        posts_repo: Arc<dyn PostRepository>,
        user: Option<AuthUser>,
        token: MountToken,
    ) -> Self {
        Self {
            blogs_repo,
            posts_repo,
            user,
            token,
            loading: true,
            blogs: Vec::new(),
            selected: None,
            posts: Vec::new(),
            error: None,
        }
    }

    /// Load the user's blogs, selecting the newest if nothing is selected.
    pub async fn load(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };

        let result = self.blogs_repo.list_by_owner(user.id).await;
        if !self.token.is_live() {
            return discard("dashboard", "blogs");
        }

        match result {
            Ok(blogs) => {
                self.blogs = blogs;
                if self.selected.is_none() {
                    self.selected = self.blogs.first().map(|b| b.id);
                }
                self.error = None;
                self.load_posts().await;
            }
            Err(e) => self.error = Some(report("dashboard", "load blogs", &e)),
        }
        self.loading = false;
    }

    /// React to the signed-in user changing.
    pub async fn set_user(&mut self, user: Option<AuthUser>) {
        if self.user.as_ref().map(|u| u.id) == user.as_ref().map(|u| u.id) {
            return;
        }
        self.user = user;
        self.blogs.clear();
        self.posts.clear();
        self.selected = None;
        self.load().await;
    }

    async fn load_posts(&mut self) {
        let Some(blog_id) = self.selected else {
            self.posts.clear();
            return;
        };

        let result = self.posts_repo.list_by_blog(blog_id).await;
        if !self.token.is_live() {
            return discard("dashboard", "posts");
        }
        // selection moved on while this was in flight
        if self.selected != Some(blog_id) {
            return;
        }

        match result {
            Ok(posts) => self.posts = posts,
            Err(e) => self.error = Some(report("dashboard", "load posts", &e)),
        }
    }

    pub fn selected_blog(&self) -> Option<&Blog> {
        let id = self.selected?;
        self.blogs.iter().find(|b| b.id == id)
    }

    pub async fn select_blog(&mut self, blog_id: Uuid) {
        if !self.blogs.iter().any(|b| b.id == blog_id) || self.selected == Some(blog_id) {
            return;
        }
        self.selected = Some(blog_id);
        self.posts.clear();
        self.load_posts().await;
    }

    /// Create a blog and select it. Returns false when nothing was created.
    pub async fn create_blog(&mut self, title: &str, description: &str) -> bool {
        let Some(user) = self.user.clone() else {
            self.error = Some(DomainError::Unauthorized.to_string());
            return false;
        };
        if title.trim().is_empty() || description.trim().is_empty() {
            let invalid = DomainError::Validation("a blog needs a title and a description".to_string());
            self.error = Some(invalid.to_string());
            return false;
        }

        let result = self
            .blogs_repo
            .insert(NewBlog::new(user.id, title, description))
            .await;
        if !self.token.is_live() {
            discard("dashboard", "created blog");
            return false;
        }

        match result {
            Ok(blog) => {
                tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Blog created");
                self.selected = Some(blog.id);
                self.blogs.insert(0, blog);
                self.posts.clear();
                self.error = None;
                self.load_posts().await;
                true
            }
            Err(e) => {
                self.error = Some(report("dashboard", "create blog", &e));
                false
            }
        }
    }

    /// Delete a blog after confirmation and select the first remaining one.
    pub async fn delete_blog(&mut self, blog_id: Uuid, confirm: &mut dyn Confirm) {
        if !confirm.confirm(DELETE_BLOG_PROMPT).await {
            return;
        }

        let result = self.blogs_repo.delete(blog_id).await;
        if !self.token.is_live() {
            return discard("dashboard", "deleted blog");
        }
        if let Err(e) = result {
            self.error = Some(report("dashboard", "delete blog", &e));
            return;
        }

        tracing::info!(blog_id = %blog_id, "Blog deleted");
        self.blogs.retain(|b| b.id != blog_id);
        self.selected = self.blogs.first().map(|b| b.id);
        self.posts.clear();
        self.error = None;
        self.load_posts().await;
    }

    pub async fn delete_post(&mut self, post_id: Uuid, confirm: &mut dyn Confirm) {
        if !confirm.confirm(DELETE_POST_PROMPT).await {
            return;
        }

        let result = self.posts_repo.delete(post_id).await;
        if !self.token.is_live() {
            return discard("dashboard", "deleted post");
        }
        match result {
            Ok(()) => {
                self.posts.retain(|p| p.id != post_id);
                self.error = None;
            }
            Err(e) => self.error = Some(report("dashboard", "delete post", &e)),
        }
    }

    /// Flip a post's publish state and keep the row the backend returns.
    pub async fn toggle_publish(&mut self, post_id: Uuid) {
        let Some(change) = self
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.toggled(Utc::now()))
        else {
            return;
        };

        let result = self.posts_repo.set_published(post_id, change).await;
        if !self.token.is_live() {
            return discard("dashboard", "publish state");
        }

        match result {
            Ok(updated) => {
                tracing::info!(post_id = %post_id, published = updated.published, "Publish state changed");
                if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post_id) {
                    *slot = updated;
                }
                self.error = None;
            }
            Err(e) => self.error = Some(report("dashboard", "change publish state", &e)),
        }
    }

    pub fn new_post(&self) -> Option<Navigation> {
        let blog_id = self.selected?;
        Some(Navigation::with(
            Page::Editor,
            NavData {
                blog_id: Some(blog_id),
                post_id: None,
            },
        ))
    }

    pub fn edit_post(&self, post_id: Uuid) -> Option<Navigation> {
        let post = self.posts.iter().find(|p| p.id == post_id)?;
        Some(Navigation::with(
            Page::Editor,
            NavData {
                blog_id: Some(post.blog_id),
                post_id: Some(post.id),
            },
        ))
    }

    /// Only published posts can be viewed.
    pub fn view_post(&self, post_id: Uuid) -> Option<Navigation> {
        let post = self.posts.iter().find(|p| p.id == post_id && p.published)?;
        Some(Navigation::with(
            Page::Post,
            NavData {
                blog_id: Some(post.blog_id),
                post_id: Some(post.id),
            },
        ))
    }
}

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loading {
            return writeln!(f, "Loading...");
        }
        write_error(f, &self.error)?;

        writeln!(f, "My Blogs")?;
        if self.blogs.is_empty() {
            writeln!(f, "  No blogs yet. Create your first blog to get started!")?;
        }
        for (i, blog) in self.blogs.iter().enumerate() {
            let marker = if Some(blog.id) == self.selected { '*' } else { ' ' };
            writeln!(f, "{marker}[{}] {} - {}", i + 1, blog.title, blog.description)?;
        }
        writeln!(f)?;

        let Some(blog) = self.selected_blog() else {
            return writeln!(f, "Select a blog or create a new one to start writing.");
        };
        writeln!(f, "{} (/{})", blog.title, blog.slug)?;
        if self.posts.is_empty() {
            return writeln!(f, "  No posts yet. Write your first post!");
        }
        for (i, post) in self.posts.iter().enumerate() {
            let status = if post.published { "Published" } else { "Draft" };
            writeln!(
                f,
                "  [{}] {} [{status}] {}",
                i + 1,
                post.title,
                short_date(&post.created_at)
            )?;
        }
        Ok(())
    }
}
