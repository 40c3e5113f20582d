use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use crate::db::backend::LikeOutcome;
use crate::db::sqlite::connection::SqlitePool;
use crate::models::{Comment, Like, LikeId, Post};

const POST_COLUMNS: &str =
    "id, username, content, created_at, updated_at, likes_count, comments_count";
const COMMENT_COLUMNS: &str = "id, post_id, username, content, created_at, updated_at";

fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        username: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        likes_count: row.get(5)?,
        comments_count: row.get(6)?,
        comments: Vec::new(),
        likes: Default::default(),
    })
}

fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        username: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_like(row: &Row) -> rusqlite::Result<Like> {
    Ok(Like {
        post_id: row.get(0)?,
        username: row.get(1)?,
        liked_at: row.get(2)?,
    })
}

pub fn list_posts(pool: &SqlitePool) -> Result<Vec<Post>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id",
            POST_COLUMNS
        ))
        .context("Failed to prepare statement")?;

    let posts = stmt
        .query_map(params![], row_to_post)
        .context("Failed to query posts")?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to map rows to posts")?;

    Ok(posts)
}

pub fn insert_post(pool: &SqlitePool, post: &Post) -> Result<bool> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let inserted = conn
        .execute(
            r#"
            INSERT INTO posts (id, username, content, created_at, updated_at, likes_count, comments_count)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)
            ON CONFLICT(id) DO NOTHING
            "#,
            params![
                post.id,
                post.username,
                post.content,
                post.created_at,
                post.updated_at
            ],
        )
        .context("Failed to insert post")?;

    Ok(inserted == 1)
}

pub fn get_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
            params![id],
            row_to_post,
        )
        .optional()
        .context("Failed to fetch post by ID")?;

    Ok(post)
}

pub fn update_post_content(
    pool: &SqlitePool,
    id: &str,
    content: &str,
    updated_at: DateTime<Utc>,
) -> Result<Option<Post>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let post = conn
        .query_row(
            &format!(
                "UPDATE posts SET content = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {}",
                POST_COLUMNS
            ),
            params![id, content, updated_at],
            row_to_post,
        )
        .optional()
        .context("Failed to update post")?;

    Ok(post)
}

pub fn delete_post(pool: &SqlitePool, id: &str) -> Result<bool> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let deleted = conn
        .execute("DELETE FROM posts WHERE id = ?1", params![id])
        .context("Failed to delete post")?;

    Ok(deleted > 0)
}

pub fn list_comments(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at DESC, id",
            COMMENT_COLUMNS
        ))
        .context("Failed to prepare statement")?;

    let comments = stmt
        .query_map(params![post_id], row_to_comment)
        .context("Failed to query comments")?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to map rows to comments")?;

    Ok(comments)
}

pub fn insert_comment(pool: &SqlitePool, comment: &Comment) -> Result<bool> {
    let mut conn = pool.get().context("Failed to get connection from pool")?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to begin transaction")?;

    let bumped = tx
        .execute(
            "UPDATE posts SET comments_count = comments_count + 1, updated_at = ?2 WHERE id = ?1",
            params![comment.post_id, comment.created_at],
        )
        .context("Failed to update comment count")?;
    if bumped == 0 {
        return Ok(false);
    }

    tx.execute(
        r#"
        INSERT INTO comments (id, post_id, username, content, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            comment.id,
            comment.post_id,
            comment.username,
            comment.content,
            comment.created_at,
            comment.updated_at
        ],
    )
    .context("Failed to insert comment")?;

    tx.commit().context("Failed to commit transaction")?;
    Ok(true)
}

pub fn get_comment(pool: &SqlitePool, post_id: &str, comment_id: &str) -> Result<Option<Comment>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let comment = conn
        .query_row(
            &format!(
                "SELECT {} FROM comments WHERE post_id = ?1 AND id = ?2",
                COMMENT_COLUMNS
            ),
            params![post_id, comment_id],
            row_to_comment,
        )
        .optional()
        .context("Failed to fetch comment")?;

    Ok(comment)
}

pub fn update_comment_content(
    pool: &SqlitePool,
    post_id: &str,
    comment_id: &str,
    content: &str,
    updated_at: DateTime<Utc>,
) -> Result<Option<Comment>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let comment = conn
        .query_row(
            &format!(
                "UPDATE comments SET content = ?3, updated_at = ?4 \
                 WHERE post_id = ?1 AND id = ?2 RETURNING {}",
                COMMENT_COLUMNS
            ),
            params![post_id, comment_id, content, updated_at],
            row_to_comment,
        )
        .optional()
        .context("Failed to update comment")?;

    Ok(comment)
}

pub fn delete_comment(
    pool: &SqlitePool,
    post_id: &str,
    comment_id: &str,
    at: DateTime<Utc>,
) -> Result<bool> {
    let mut conn = pool.get().context("Failed to get connection from pool")?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to begin transaction")?;

    let deleted = tx
        .execute(
            "DELETE FROM comments WHERE post_id = ?1 AND id = ?2",
            params![post_id, comment_id],
        )
        .context("Failed to delete comment")?;
    if deleted == 0 {
        return Ok(false);
    }

    tx.execute(
        "UPDATE posts SET comments_count = MAX(comments_count - 1, 0), updated_at = ?2 WHERE id = ?1",
        params![post_id, at],
    )
    .context("Failed to update comment count")?;

    tx.commit().context("Failed to commit transaction")?;
    Ok(true)
}

pub fn list_likes(pool: &SqlitePool, post_id: &str) -> Result<Vec<Like>> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    let mut stmt = conn
        .prepare(
            "SELECT post_id, username, liked_at FROM likes WHERE post_id = ?1 \
             ORDER BY liked_at, username",
        )
        .context("Failed to prepare statement")?;

    let likes = stmt
        .query_map(params![post_id], row_to_like)
        .context("Failed to query likes")?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to map rows to likes")?;

    Ok(likes)
}

pub fn insert_like(pool: &SqlitePool, like: &Like) -> Result<LikeOutcome> {
    let mut conn = pool.get().context("Failed to get connection from pool")?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to begin transaction")?;

    let post_exists = tx
        .query_row("SELECT 1 FROM posts WHERE id = ?1", params![like.post_id], |_| Ok(()))
        .optional()
        .context("Failed to check post")?
        .is_some();
    if !post_exists {
        return Ok(LikeOutcome::PostNotFound);
    }

    let inserted = tx
        .execute(
            r#"
            INSERT INTO likes (post_id, username, liked_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(post_id, username) DO NOTHING
            "#,
            params![like.post_id, like.username, like.liked_at],
        )
        .context("Failed to insert like")?;
    if inserted == 0 {
        return Ok(LikeOutcome::AlreadyLiked);
    }

    tx.execute(
        "UPDATE posts SET likes_count = likes_count + 1, updated_at = ?2 WHERE id = ?1",
        params![like.post_id, like.liked_at],
    )
    .context("Failed to update like count")?;

    tx.commit().context("Failed to commit transaction")?;
    Ok(LikeOutcome::Added)
}

pub fn delete_like(pool: &SqlitePool, id: &LikeId, at: DateTime<Utc>) -> Result<bool> {
    let mut conn = pool.get().context("Failed to get connection from pool")?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to begin transaction")?;

    let deleted = tx
        .execute(
            "DELETE FROM likes WHERE post_id = ?1 AND username = ?2",
            params![id.post_id, id.username],
        )
        .context("Failed to delete like")?;
    if deleted == 0 {
        return Ok(false);
    }

    tx.execute(
        "UPDATE posts SET likes_count = MAX(likes_count - 1, 0), updated_at = ?2 WHERE id = ?1",
        params![id.post_id, at],
    )
    .context("Failed to update like count")?;

    tx.commit().context("Failed to commit transaction")?;
    Ok(true)
}

pub fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    conn.query_row("SELECT COUNT(*) FROM posts", params![], |row| row.get(0))
        .context("Failed to count posts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::sqlite::connection::{create_pool, init_schema};

    fn test_pool() -> SqlitePool {
        let path = std::env::temp_dir()
            .join(format!("socialapp-queries-{}.db", uuid::Uuid::new_v4()));
        let config = DatabaseConfig {
            url: String::new(),
            max_connections: 4,
            acquire_timeout_ms: 5_000,
        };
        let pool = create_pool(path.to_str().unwrap(), &config).unwrap();
        init_schema(&pool).unwrap();
        pool
    }

    fn seed_post(pool: &SqlitePool, id: &str) -> Post {
        let post = Post::new(id.into(), "alice".into(), "hello".into(), Utc::now());
        assert!(insert_post(pool, &post).unwrap());
        post
    }

    #[test]
    fn test_insert_post_rejects_duplicate_id() {
        let pool = test_pool();
        let post = seed_post(&pool, "p1");
        assert!(!insert_post(&pool, &post).unwrap());
        assert_eq!(count_posts(&pool).unwrap(), 1);
    }

    #[test]
    fn test_round_trip_keeps_timestamps() {
        let pool = test_pool();
        let post = seed_post(&pool, "p1");
        let stored = get_post(&pool, "p1").unwrap().unwrap();
        assert_eq!(stored, post);
    }

    #[test]
    fn test_comment_counter_follows_rows() {
        let pool = test_pool();
        seed_post(&pool, "p1");
        let now = Utc::now();
        let first = Comment::new("p1".into(), "bob".into(), "one".into(), now);
        let second = Comment::new("p1".into(), "carol".into(), "two".into(), now);
        assert!(insert_comment(&pool, &first).unwrap());
        assert!(insert_comment(&pool, &second).unwrap());
        assert_eq!(get_post(&pool, "p1").unwrap().unwrap().comments_count, 2);

        assert!(delete_comment(&pool, "p1", &first.id, now).unwrap());
        assert!(!delete_comment(&pool, "p1", &first.id, now).unwrap());
        assert_eq!(get_post(&pool, "p1").unwrap().unwrap().comments_count, 1);
        assert_eq!(list_comments(&pool, "p1").unwrap(), vec![second]);
    }

    #[test]
    fn test_comment_on_missing_post() {
        let pool = test_pool();
        let comment = Comment::new("nope".into(), "bob".into(), "hi".into(), Utc::now());
        assert!(!insert_comment(&pool, &comment).unwrap());
    }

    #[test]
    fn test_like_outcomes() {
        let pool = test_pool();
        seed_post(&pool, "p1");
        let like = Like::new("p1".into(), "bob".into(), Utc::now());

        assert_eq!(insert_like(&pool, &like).unwrap(), LikeOutcome::Added);
        assert_eq!(insert_like(&pool, &like).unwrap(), LikeOutcome::AlreadyLiked);
        let orphan = Like::new("missing".into(), "bob".into(), Utc::now());
        assert_eq!(insert_like(&pool, &orphan).unwrap(), LikeOutcome::PostNotFound);
        assert_eq!(get_post(&pool, "p1").unwrap().unwrap().likes_count, 1);

        assert!(delete_like(&pool, &like.id(), Utc::now()).unwrap());
        assert!(!delete_like(&pool, &like.id(), Utc::now()).unwrap());
        assert_eq!(get_post(&pool, "p1").unwrap().unwrap().likes_count, 0);
    }

    #[test]
    fn test_delete_post_cascades() {
        let pool = test_pool();
        seed_post(&pool, "p1");
        let now = Utc::now();
        let comment = Comment::new("p1".into(), "bob".into(), "hi".into(), now);
        insert_comment(&pool, &comment).unwrap();
        insert_like(&pool, &Like::new("p1".into(), "bob".into(), now)).unwrap();

        assert!(delete_post(&pool, "p1").unwrap());
        assert!(list_comments(&pool, "p1").unwrap().is_empty());
        assert!(list_likes(&pool, "p1").unwrap().is_empty());
        assert!(!delete_post(&pool, "p1").unwrap());
    }
}
