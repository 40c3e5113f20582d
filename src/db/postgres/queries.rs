use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::backend::LikeOutcome;
use crate::models::{Comment, Like, LikeId, Post};

pub async fn list_posts(pool: &PgPool) -> Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, username, content, created_at, updated_at, likes_count, comments_count
        FROM posts
        ORDER BY created_at DESC, id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to query posts")
}

pub async fn insert_post(pool: &PgPool, post: &Post) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO posts (id, username, content, created_at, updated_at, likes_count, comments_count)
        VALUES ($1, $2, $3, $4, $5, 0, 0)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&post.id)
    .bind(&post.username)
    .bind(&post.content)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_post(pool: &PgPool, id: &str) -> Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, username, content, created_at, updated_at, likes_count, comments_count
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch post by ID")
}

pub async fn update_post_content(
    pool: &PgPool,
    id: &str,
    content: &str,
    updated_at: DateTime<Utc>,
) -> Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET content = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, username, content, created_at, updated_at, likes_count, comments_count
        "#,
    )
    .bind(id)
    .bind(content)
    .bind(updated_at)
    .fetch_optional(pool)
    .await
    .context("Failed to update post")
}

pub async fn delete_post(pool: &PgPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_comments(pool: &PgPool, post_id: &str) -> Result<Vec<Comment>> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, username, content, created_at, updated_at
        FROM comments
        WHERE post_id = $1
        ORDER BY created_at DESC, id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to query comments")
}

pub async fn insert_comment(pool: &PgPool, comment: &Comment) -> Result<bool> {
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    let bumped = sqlx::query(
        "UPDATE posts SET comments_count = comments_count + 1, updated_at = $2 WHERE id = $1",
    )
    .bind(&comment.post_id)
    .bind(comment.created_at)
    .execute(&mut *transaction)
    .await
    .context("Failed to update comment count")?;
    if bumped.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO comments (id, post_id, username, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&comment.id)
    .bind(&comment.post_id)
    .bind(&comment.username)
    .bind(&comment.content)
    .bind(comment.created_at)
    .bind(comment.updated_at)
    .execute(&mut *transaction)
    .await
    .context("Failed to insert comment")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;
    Ok(true)
}

pub async fn get_comment(pool: &PgPool, post_id: &str, comment_id: &str) -> Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, username, content, created_at, updated_at
        FROM comments
        WHERE post_id = $1 AND id = $2
        "#,
    )
    .bind(post_id)
    .bind(comment_id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch comment")
}

pub async fn update_comment_content(
    pool: &PgPool,
    post_id: &str,
    comment_id: &str,
    content: &str,
    updated_at: DateTime<Utc>,
) -> Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments SET content = $3, updated_at = $4
        WHERE post_id = $1 AND id = $2
        RETURNING id, post_id, username, content, created_at, updated_at
        "#,
    )
    .bind(post_id)
    .bind(comment_id)
    .bind(content)
    .bind(updated_at)
    .fetch_optional(pool)
    .await
    .context("Failed to update comment")
}

pub async fn delete_comment(
    pool: &PgPool,
    post_id: &str,
    comment_id: &str,
    at: DateTime<Utc>,
) -> Result<bool> {
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    let deleted = sqlx::query("DELETE FROM comments WHERE post_id = $1 AND id = $2")
        .bind(post_id)
        .bind(comment_id)
        .execute(&mut *transaction)
        .await
        .context("Failed to delete comment")?;
    if deleted.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        "UPDATE posts SET comments_count = GREATEST(comments_count - 1, 0), updated_at = $2 WHERE id = $1",
    )
    .bind(post_id)
    .bind(at)
    .execute(&mut *transaction)
    .await
    .context("Failed to update comment count")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;
    Ok(true)
}

pub async fn list_likes(pool: &PgPool, post_id: &str) -> Result<Vec<Like>> {
    sqlx::query_as::<_, Like>(
        r#"
        SELECT post_id, username, liked_at
        FROM likes
        WHERE post_id = $1
        ORDER BY liked_at, username
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to query likes")
}

pub async fn insert_like(pool: &PgPool, like: &Like) -> Result<LikeOutcome> {
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    // Row lock keeps a concurrent delete of the post from racing the insert.
    let post_exists = sqlx::query("SELECT 1 FROM posts WHERE id = $1 FOR UPDATE")
        .bind(&like.post_id)
        .fetch_optional(&mut *transaction)
        .await
        .context("Failed to check post")?
        .is_some();
    if !post_exists {
        return Ok(LikeOutcome::PostNotFound);
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO likes (post_id, username, liked_at) VALUES ($1, $2, $3)
        ON CONFLICT (post_id, username) DO NOTHING
        "#,
    )
    .bind(&like.post_id)
    .bind(&like.username)
    .bind(like.liked_at)
    .execute(&mut *transaction)
    .await
    .context("Failed to insert like")?;
    if inserted.rows_affected() == 0 {
        return Ok(LikeOutcome::AlreadyLiked);
    }

    sqlx::query("UPDATE posts SET likes_count = likes_count + 1, updated_at = $2 WHERE id = $1")
        .bind(&like.post_id)
        .bind(like.liked_at)
        .execute(&mut *transaction)
        .await
        .context("Failed to update like count")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;
    Ok(LikeOutcome::Added)
}

pub async fn delete_like(pool: &PgPool, id: &LikeId, at: DateTime<Utc>) -> Result<bool> {
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    let deleted = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND username = $2")
        .bind(&id.post_id)
        .bind(&id.username)
        .execute(&mut *transaction)
        .await
        .context("Failed to delete like")?;
    if deleted.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        "UPDATE posts SET likes_count = GREATEST(likes_count - 1, 0), updated_at = $2 WHERE id = $1",
    )
    .bind(&id.post_id)
    .bind(at)
    .execute(&mut *transaction)
    .await
    .context("Failed to update like count")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;
    Ok(true)
}

pub async fn count_posts(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;
    Ok(count)
}
