use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Blog, NewBlog, NewPost, Post, PostChanges, PostWithBlog, Profile, ProfileChanges,
    PublishChange,
};
use crate::error::RepoError;

/// Profile access.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// Update the editable fields and return the stored profile.
    async fn update(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile, RepoError>;
}

/// Blog access.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Blogs owned by a user, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Blog>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError>;

    async fn insert(&self, blog: NewBlog) -> Result<Blog, RepoError>;

    /// Delete a blog. Its posts are removed by the backend.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post access.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts in a blog, newest first, drafts included.
    async fn list_by_blog(&self, blog_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// A post, only if it is published.
    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Most recently published posts joined with their blog.
    async fn recent_published(&self, limit: usize) -> Result<Vec<PostWithBlog>, RepoError>;

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn update_content(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    async fn set_published(&self, id: Uuid, change: PublishChange) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
