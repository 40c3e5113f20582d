use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Instant;

use crate::db::{Database, DatabaseBackend, LikeOutcome};
use crate::metrics::registry::{DATABASE_QUERIES_TOTAL, DATABASE_QUERY_DURATION_SECONDS};
use crate::models::{Comment, Like, LikeId, Post};

/// Wraps a DatabaseBackend and records query counts and durations per
/// query type.
pub struct InstrumentedDatabase {
    inner: Database,
}

impl InstrumentedDatabase {
    pub fn new(inner: Database) -> Self {
        Self { inner }
    }

    async fn observe<T>(&self, query_type: &'static str, query: impl Future<Output = T>) -> T {
        let start = Instant::now();
        let res = query.await;
        DATABASE_QUERIES_TOTAL
            .with_label_values(&[query_type])
            .inc();
        DATABASE_QUERY_DURATION_SECONDS
            .with_label_values(&[query_type])
            .observe(start.elapsed().as_secs_f64());
        res
    }
}

#[async_trait]
impl DatabaseBackend for InstrumentedDatabase {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.observe("select", self.inner.list_posts()).await
    }

    async fn insert_post(&self, post: &Post) -> Result<bool> {
        self.observe("insert", self.inner.insert_post(post)).await
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        self.observe("select", self.inner.get_post(id)).await
    }

    async fn update_post_content(
        &self,
        id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        self.observe(
            "update",
            self.inner.update_post_content(id, content, updated_at),
        )
        .await
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        self.observe("delete", self.inner.delete_post(id)).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        self.observe("select", self.inner.list_comments(post_id)).await
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<bool> {
        self.observe("insert", self.inner.insert_comment(comment)).await
    }

    async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Option<Comment>> {
        self.observe("select", self.inner.get_comment(post_id, comment_id))
            .await
    }

    async fn update_comment_content(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>> {
        self.observe(
            "update",
            self.inner
                .update_comment_content(post_id, comment_id, content, updated_at),
        )
        .await
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.observe("delete", self.inner.delete_comment(post_id, comment_id, at))
            .await
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>> {
        self.observe("select", self.inner.list_likes(post_id)).await
    }

    async fn insert_like(&self, like: &Like) -> Result<LikeOutcome> {
        self.observe("insert", self.inner.insert_like(like)).await
    }

    async fn delete_like(&self, id: &LikeId, at: DateTime<Utc>) -> Result<bool> {
        self.observe("delete", self.inner.delete_like(id, at)).await
    }

    async fn count_posts(&self) -> Result<i64> {
        self.observe("select", self.inner.count_posts()).await
    }

    async fn test_connection(&self) -> Result<()> {
        self.observe("select", self.inner.test_connection()).await
    }
}
