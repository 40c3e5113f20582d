use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Comment, Like, LikeId, Post};

/// Result of inserting a like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Added,
    AlreadyLiked,
    PostNotFound,
}

/// Database backend trait for abstracting PostgreSQL and SQLite.
///
/// Every method that changes the comments or likes of a post also updates
/// that post's counter and `updated_at` in the same transaction.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// All posts, newest first. `comments` and `likes` are left empty.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Insert a post. Returns `false` if the id is already taken.
    async fn insert_post(&self, post: &Post) -> Result<bool>;

    /// Get a post by id, without its comments and likes
    async fn get_post(&self, id: &str) -> Result<Option<Post>>;

    /// Replace the content of a post
    async fn update_post_content(
        &self,
        id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// Delete a post together with its comments and likes
    async fn delete_post(&self, id: &str) -> Result<bool>;

    /// Comments of a post, newest first
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>>;

    /// Insert a comment. Returns `false` if the post does not exist.
    async fn insert_comment(&self, comment: &Comment) -> Result<bool>;

    async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Option<Comment>>;

    async fn update_comment_content(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>>;

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Likes of a post, oldest first
    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>>;

    async fn insert_like(&self, like: &Like) -> Result<LikeOutcome>;

    /// Remove a like. Returns `false` if there was none.
    async fn delete_like(&self, id: &LikeId, at: DateTime<Utc>) -> Result<bool>;

    /// Total number of posts
    async fn count_posts(&self) -> Result<i64>;

    /// Test database connection
    async fn test_connection(&self) -> Result<()>;
}
