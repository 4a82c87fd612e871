//! Home - the public feed of recently published posts.

use std::fmt;
use std::sync::Arc;

use blogspace_core::domain::{PostWithBlog, card_excerpt};
use blogspace_core::ports::PostRepository;

use super::{discard, report, short_date, write_error};
use crate::lifecycle::MountToken;
use crate::router::{NavData, Navigation, Page};

/// Number of posts in the feed.
pub const RECENT_LIMIT: usize = 9;

pub struct HomePage {
    posts: Arc<dyn PostRepository>,
    token: MountToken,
    pub loading: bool,
    pub recent: Vec<PostWithBlog>,
    pub error: Option<String>,
}

impl HomePage {
    pub fn new(posts: Arc<dyn PostRepository>, token: MountToken) -> Self {
        Self {
            posts,
            token,
            loading: true,
            recent: Vec::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) {
        let result = self.posts.recent_published(RECENT_LIMIT).await;
        if !self.token.is_live() {
            return discard("home", "recent posts");
        }

        match result {
            Ok(recent) => {
                self.recent = recent;
                self.error = None;
            }
            Err(e) => self.error = Some(report("home", "load recent posts", &e)),
        }
        self.loading = false;
    }

    /// Open the card at `index` (zero-based).
    pub fn open(&self, index: usize) -> Option<Navigation> {
        let entry = self.recent.get(index)?;
        Some(Navigation::with(
            Page::Post,
            NavData {
                blog_id: Some(entry.post.blog_id),
                post_id: Some(entry.post.id),
            },
        ))
    }

    pub fn get_started(&self) -> Navigation {
        Navigation::to(Page::SignUp)
    }
}

impl fmt::Display for HomePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Share Your Story With The World")?;
        writeln!(
            f,
            "Create beautiful blogs, write engaging posts, and connect with readers around the globe."
        )?;
        writeln!(f)?;
        writeln!(f, "Recent Posts")?;
        write_error(f, &self.error)?;

        if self.loading {
            return writeln!(f, "Loading posts...");
        }
        if self.recent.is_empty() {
            writeln!(f, "No posts yet. Be the first to share your story!")?;
            return writeln!(f, "-> Create Your Blog (signup)");
        }

        for (i, entry) in self.recent.iter().enumerate() {
            let post = &entry.post;
            writeln!(f, "[{}] {} | {}", i + 1, entry.blog.title, post.title)?;
            writeln!(f, "    {}", card_excerpt(&post.excerpt, &post.content))?;
            if let Some(at) = &post.published_at {
                writeln!(f, "    {}  Read more ->", short_date(at))?;
            }
        }
        Ok(())
    }
}
