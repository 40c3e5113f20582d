use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use crate::db::{Database, LikeOutcome};
use crate::errors::ApiError;
use crate::metrics::registry::{COMMENTS_CREATED_TOTAL, LIKES_TOTAL, POSTS_CREATED_TOTAL};
use crate::models::post::new_id;
use crate::models::requests::{
    CreateCommentRequest, CreatePostRequest, LikeParams, UpdateContentRequest, ValidateRequest,
};
use crate::models::{Comment, Like, LikeId, Post};

pub const POST_NOT_FOUND: &str = "Post not found";
pub const COMMENT_NOT_FOUND: &str = "Comment not found";
pub const LIKE_NOT_FOUND: &str = "Like not found";

/// Current time at microsecond precision, the finest both backends store
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Posts, comments and likes on top of a storage backend.
///
/// Every request type is validated here, so callers other than the HTTP
/// handlers get the same field errors.
pub struct SocialService {
    db: Database,
}

impl SocialService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Check that storage answers
    pub async fn ready(&self) -> Result<(), ApiError> {
        self.db.test_connection().await?;
        Ok(())
    }

    pub async fn count_posts(&self) -> Result<i64, ApiError> {
        Ok(self.db.count_posts().await?)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.db.list_posts().await?)
    }

    pub async fn create_post(&self, req: CreatePostRequest) -> Result<Post, ApiError> {
        req.check()?;

        let id = req.id.unwrap_or_else(new_id);
        let post = Post::new(id, req.username, req.content, now());
        if !self.db.insert_post(&post).await? {
            return Err(ApiError::invalid("Post ID already exists"));
        }

        POSTS_CREATED_TOTAL.inc();
        info!(post_id = %post.id, username = %post.username, "Post created");
        Ok(post)
    }

    /// A post with its comments and likes filled in
    pub async fn get_post(&self, id: &str) -> Result<Post, ApiError> {
        let mut post = self.find_post(id).await?;
        post.comments = self.db.list_comments(id).await?;
        post.likes = self.db.list_likes(id).await?.into_iter().collect();
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, req: UpdateContentRequest) -> Result<Post, ApiError> {
        req.check()?;

        let post = self.find_post(id).await?;
        if post.username != req.username {
            return Err(ApiError::invalid("Only the author can modify this post"));
        }

        let updated = self
            .db
            .update_post_content(id, &req.content, now())
            .await?
            .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;
        debug!(post_id = %id, "Post updated");
        Ok(updated)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        if !self.db.delete_post(id).await? {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }
        info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.find_post(post_id).await?;
        Ok(self.db.list_comments(post_id).await?)
    }

    pub async fn create_comment(
        &self,
        post_id: &str,
        req: CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        req.check()?;

        let comment = Comment::new(post_id.to_string(), req.username, req.content, now());
        if !self.db.insert_comment(&comment).await? {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }

        COMMENTS_CREATED_TOTAL.inc();
        debug!(post_id = %post_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    pub async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Comment, ApiError> {
        self.db
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))
    }

    pub async fn update_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        req: UpdateContentRequest,
    ) -> Result<Comment, ApiError> {
        req.check()?;

        let comment = self.get_comment(post_id, comment_id).await?;
        if comment.username != req.username {
            return Err(ApiError::invalid("Only the author can modify this comment"));
        }

        self.db
            .update_comment_content(post_id, comment_id, &req.content, now())
            .await?
            .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<(), ApiError> {
        if !self.db.delete_comment(post_id, comment_id, now()).await? {
            return Err(ApiError::not_found(COMMENT_NOT_FOUND));
        }
        Ok(())
    }

    pub async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>, ApiError> {
        self.find_post(post_id).await?;
        Ok(self.db.list_likes(post_id).await?)
    }

    pub async fn like_post(&self, post_id: &str, params: LikeParams) -> Result<Like, ApiError> {
        params.check()?;

        let like = Like::new(post_id.to_string(), params.username, now());
        match self.db.insert_like(&like).await? {
            LikeOutcome::Added => {
                LIKES_TOTAL.with_label_values(&["like"]).inc();
                debug!(post_id = %post_id, username = %like.username, "Post liked");
                Ok(like)
            }
            LikeOutcome::AlreadyLiked => Err(ApiError::invalid("Already liked this post")),
            LikeOutcome::PostNotFound => Err(ApiError::not_found(POST_NOT_FOUND)),
        }
    }

    pub async fn unlike_post(&self, post_id: &str, params: LikeParams) -> Result<(), ApiError> {
        params.check()?;

        let id = LikeId {
            post_id: post_id.to_string(),
            username: params.username,
        };
        if !self.db.delete_like(&id, now()).await? {
            return Err(ApiError::not_found(LIKE_NOT_FOUND));
        }

        LIKES_TOTAL.with_label_values(&["unlike"]).inc();
        debug!(post_id = %post_id, username = %id.username, "Post unliked");
        Ok(())
    }

    async fn find_post(&self, id: &str) -> Result<Post, ApiError> {
        self.db
            .get_post(id)
            .await?
            .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))
    }
}
