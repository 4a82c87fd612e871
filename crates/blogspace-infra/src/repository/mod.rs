//! Typed repositories over any [`DataClient`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use blogspace_core::domain::{
    Blog, NewBlog, NewPost, Post, PostChanges, PostWithBlog, Profile, ProfileChanges,
    PublishChange,
};
use blogspace_core::error::RepoError;
use blogspace_core::ports::{
    BlogRepository, DataClient, Direction, Filter, PostRepository, ProfileRepository, Query,
    Table,
};

/// Repository implementation shared by every collection.
#[derive(Clone)]
pub struct DataRepository {
    client: Arc<dyn DataClient>,
}

impl DataRepository {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: Table,
        query: Query,
    ) -> Result<Vec<T>, RepoError> {
        let rows = self.client.select(table, &query).await?;
        rows.into_iter().map(decode).collect()
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: Table,
        query: Query,
    ) -> Result<Option<T>, RepoError> {
        let mut rows = self.fetch(table, query.limit(1)).await?;
        Ok(rows.pop())
    }

    async fn insert_row<P: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: Table,
        payload: &P,
    ) -> Result<T, RepoError> {
        let row = self.client.insert(table, serde_json::to_value(payload)?).await?;
        decode(row)
    }

    /// Patch one row by id and return it as stored.
    async fn update_row<P: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: Table,
        id: Uuid,
        patch: &P,
    ) -> Result<T, RepoError> {
        let rows = self
            .client
            .update(table, &[Filter::eq("id", id)], serde_json::to_value(patch)?)
            .await?;
        rows.into_iter().next().map(decode).ok_or(RepoError::NotFound)?
    }

    async fn delete_row(&self, table: Table, id: Uuid) -> Result<(), RepoError> {
        self.client.delete(table, &[Filter::eq("id", id)]).await
    }
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, RepoError> {
    Ok(serde_json::from_value(row)?)
}

#[async_trait]
impl ProfileRepository for DataRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        self.fetch_one(Table::Profiles, Query::new().eq("id", id)).await
    }

    async fn update(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile, RepoError> {
        tracing::debug!(profile_id = %id, "Updating profile");
        self.update_row(Table::Profiles, id, &changes).await
    }
}

#[async_trait]
impl BlogRepository for DataRepository {
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Blog>, RepoError> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order("created_at", Direction::Descending);
        self.fetch(Table::Blogs, query).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError> {
        self.fetch_one(Table::Blogs, Query::new().eq("id", id)).await
    }

    async fn insert(&self, blog: NewBlog) -> Result<Blog, RepoError> {
        tracing::debug!(slug = %blog.slug, "Creating blog");
        self.insert_row(Table::Blogs, &blog).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        tracing::debug!(blog_id = %id, "Deleting blog");
        self.delete_row(Table::Blogs, id).await
    }
}

#[async_trait]
impl PostRepository for DataRepository {
    async fn list_by_blog(&self, blog_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let query = Query::new()
            .eq("blog_id", blog_id)
            .order("created_at", Direction::Descending);
        self.fetch(Table::Posts, query).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.fetch_one(Table::Posts, Query::new().eq("id", id)).await
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let query = Query::new().eq("id", id).eq("published", true);
        self.fetch_one(Table::Posts, query).await
    }

    async fn recent_published(&self, limit: usize) -> Result<Vec<PostWithBlog>, RepoError> {
        let query = Query::new()
            .embed("blog", Table::Blogs, "blog_id")
            .eq("published", true)
            .order("published_at", Direction::Descending)
            .limit(limit);
        self.fetch(Table::Posts, query).await
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        tracing::debug!(blog_id = %post.blog_id, slug = %post.slug, "Creating post");
        self.insert_row(Table::Posts, &post).await
    }

    async fn update_content(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        tracing::debug!(post_id = %id, "Updating post content");
        self.update_row(Table::Posts, id, &changes).await
    }

    async fn set_published(&self, id: Uuid, change: PublishChange) -> Result<Post, RepoError> {
        tracing::debug!(post_id = %id, published = change.published, "Changing publish state");
        self.update_row(Table::Posts, id, &change).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        tracing::debug!(post_id = %id, "Deleting post");
        self.delete_row(Table::Posts, id).await
    }
}
