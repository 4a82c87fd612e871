//! Post view - a single published post with author attribution.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use blogspace_core::RepoError;
use blogspace_core::domain::{Blog, Post, Profile};
use blogspace_core::ports::{BlogRepository, PostRepository, ProfileRepository};

use super::{discard, long_date, report, write_error};
use crate::lifecycle::MountToken;
use crate::router::{Navigation, Page};

const DEFAULT_BIO: &str = "Writer and blogger";

#[derive(Debug, Clone, PartialEq)]
pub enum PostViewState {
    Loading,
    /// Missing, unpublished, or its blog is gone.
    NotFound,
    Loaded {
        post: Post,
        blog: Blog,
        author: Option<Profile>,
    },
}

pub struct PostViewPage {
    posts: Arc<dyn PostRepository>,
    blogs: Arc<dyn BlogRepository>,
    profiles: Arc<dyn ProfileRepository>,
    blog_id: Option<Uuid>,
    post_id: Option<Uuid>,
    token: MountToken,
    pub state: PostViewState,
    pub error: Option<String>,
}

impl PostViewPage {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        blogs: Arc<dyn BlogRepository>,
        profiles: Arc<dyn ProfileRepository>,
        blog_id: Option<Uuid>,
        post_id: Option<Uuid>,
        token: MountToken,
    ) -> Self {
        Self {
            posts,
            blogs,
            profiles,
            blog_id,
            post_id,
            token,
            state: PostViewState::Loading,
            error: None,
        }
    }

    /// Load the post, then its blog, then the blog owner's profile.
    pub async fn load(&mut self) {
        let result = self.fetch().await;
        if !self.token.is_live() {
            return discard("post", "post");
        }

        self.state = match result {
            Ok(state) => state,
            Err(e) => {
                self.error = Some(report("post", "load post", &e));
                PostViewState::NotFound
            }
        };
    }

    async fn fetch(&self) -> Result<PostViewState, RepoError> {
        let Some(post_id) = self.post_id else {
            return Ok(PostViewState::NotFound);
        };
        let Some(post) = self.posts.find_published(post_id).await? else {
            return Ok(PostViewState::NotFound);
        };

        let blog_id = self.blog_id.unwrap_or(post.blog_id);
        let Some(blog) = self.blogs.find_by_id(blog_id).await? else {
            return Ok(PostViewState::NotFound);
        };

        // attribution is optional; a failed lookup still shows the post
        let author = match self.profiles.find_by_id(blog.user_id).await {
            Ok(author) => author,
            Err(e) => {
                tracing::warn!(user_id = %blog.user_id, error = %e, "Failed to load author");
                None
            }
        };

        Ok(PostViewState::Loaded { post, blog, author })
    }

    pub fn back(&self) -> Navigation {
        Navigation::to(Page::Home)
    }
}

impl fmt::Display for PostViewPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<- Back to Home")?;
        write_error(f, &self.error)?;

        let (post, blog, author) = match &self.state {
            PostViewState::Loading => return writeln!(f, "Loading post..."),
            PostViewState::NotFound => {
                writeln!(f, "Post Not Found")?;
                return writeln!(f, "This post may have been removed or is not published yet.");
            }
            PostViewState::Loaded { post, blog, author } => (post, blog, author.as_ref()),
        };

        writeln!(f, "{}", blog.title)?;
        writeln!(f, "# {}", post.title)?;
        let name = author.map(|a| a.display_name.as_str()).unwrap_or_default();
        match &post.published_at {
            Some(at) => writeln!(f, "{name}  {}", long_date(at))?,
            None => writeln!(f, "{name}")?,
        }
        if !post.excerpt.is_empty() {
            writeln!(f)?;
            writeln!(f, "> {}", post.excerpt)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", post.content)?;
        writeln!(f)?;

        let badge = author.and_then(Profile::initial).unwrap_or(' ');
        writeln!(f, "({badge}) {name}")?;
        let bio = author.map(|a| a.bio.as_str()).filter(|b| !b.is_empty());
        writeln!(f, "    {}", bio.unwrap_or(DEFAULT_BIO))?;
        writeln!(f, "    More from {}", blog.title)
    }
}
