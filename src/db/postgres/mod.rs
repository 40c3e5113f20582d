pub mod connection;
pub mod queries;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::backend::{DatabaseBackend, LikeOutcome};
use crate::models::{Comment, Like, LikeId, Post};

pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseBackend for PostgresBackend {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        queries::list_posts(&self.pool).await
    }

    async fn insert_post(&self, post: &Post) -> Result<bool> {
        queries::insert_post(&self.pool, post).await
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        queries::get_post(&self.pool, id).await
    }

    async fn update_post_content(
        &self,
        id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        queries::update_post_content(&self.pool, id, content, updated_at).await
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        queries::delete_post(&self.pool, id).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        queries::list_comments(&self.pool, post_id).await
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<bool> {
        queries::insert_comment(&self.pool, comment).await
    }

    async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Option<Comment>> {
        queries::get_comment(&self.pool, post_id, comment_id).await
    }

    async fn update_comment_content(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>> {
        queries::update_comment_content(&self.pool, post_id, comment_id, content, updated_at).await
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        queries::delete_comment(&self.pool, post_id, comment_id, at).await
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>> {
        queries::list_likes(&self.pool, post_id).await
    }

    async fn insert_like(&self, like: &Like) -> Result<LikeOutcome> {
        queries::insert_like(&self.pool, like).await
    }

    async fn delete_like(&self, id: &LikeId, at: DateTime<Utc>) -> Result<bool> {
        queries::delete_like(&self.pool, id, at).await
    }

    async fn count_posts(&self) -> Result<i64> {
        queries::count_posts(&self.pool).await
    }

    async fn test_connection(&self) -> Result<()> {
        connection::test_connection(&self.pool).await
    }
}
