pub mod connection;
pub mod queries;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::backend::{DatabaseBackend, LikeOutcome};
use crate::db::sqlite::connection::SqlitePool;
use crate::models::{Comment, Like, LikeId, Post};

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Result<Self> {
        // Initialize schema on creation
        connection::init_schema(&pool)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::list_posts(&pool)).await?
    }

    async fn insert_post(&self, post: &Post) -> Result<bool> {
        let pool = self.pool.clone();
        let post = post.clone();
        tokio::task::spawn_blocking(move || queries::insert_post(&pool, &post)).await?
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || queries::get_post(&pool, &id)).await?
    }

    async fn update_post_content(
        &self,
        id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let content = content.to_string();
        tokio::task::spawn_blocking(move || {
            queries::update_post_content(&pool, &id, &content, updated_at)
        })
        .await?
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || queries::delete_post(&pool, &id)).await?
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let pool = self.pool.clone();
        let post_id = post_id.to_string();
        tokio::task::spawn_blocking(move || queries::list_comments(&pool, &post_id)).await?
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<bool> {
        let pool = self.pool.clone();
        let comment = comment.clone();
        tokio::task::spawn_blocking(move || queries::insert_comment(&pool, &comment)).await?
    }

    async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Option<Comment>> {
        let pool = self.pool.clone();
        let post_id = post_id.to_string();
        let comment_id = comment_id.to_string();
        tokio::task::spawn_blocking(move || queries::get_comment(&pool, &post_id, &comment_id))
            .await?
    }

    async fn update_comment_content(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>> {
        let pool = self.pool.clone();
        let post_id = post_id.to_string();
        let comment_id = comment_id.to_string();
        let content = content.to_string();
        tokio::task::spawn_blocking(move || {
            queries::update_comment_content(&pool, &post_id, &comment_id, &content, updated_at)
        })
        .await?
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let pool = self.pool.clone();
        let post_id = post_id.to_string();
        let comment_id = comment_id.to_string();
        tokio::task::spawn_blocking(move || {
            queries::delete_comment(&pool, &post_id, &comment_id, at)
        })
        .await?
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>> {
        let pool = self.pool.clone();
        let post_id = post_id.to_string();
        tokio::task::spawn_blocking(move || queries::list_likes(&pool, &post_id)).await?
    }

    async fn insert_like(&self, like: &Like) -> Result<LikeOutcome> {
        let pool = self.pool.clone();
        let like = like.clone();
        tokio::task::spawn_blocking(move || queries::insert_like(&pool, &like)).await?
    }

    async fn delete_like(&self, id: &LikeId, at: DateTime<Utc>) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.clone();
        tokio::task::spawn_blocking(move || queries::delete_like(&pool, &id, at)).await?
    }

    async fn count_posts(&self) -> Result<i64> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::count_posts(&pool)).await?
    }

    async fn test_connection(&self) -> Result<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || connection::test_connection(&pool)).await?
    }
}
