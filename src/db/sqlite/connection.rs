use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::time::Duration;

use crate::config::DatabaseConfig;

pub type SqlitePool = Pool<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_pool(database_path: &str, config: &DatabaseConfig) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = Path::new(database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
    }

    // Cascading deletes of comments and likes rely on foreign keys, which
    // SQLite enables per connection.
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)
    });

    Pool::builder()
        .max_size(config.max_connections.max(1))
        .connection_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .build(manager)
        .context("Failed to create SQLite connection pool")
}

pub fn test_connection(pool: &SqlitePool) -> Result<()> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    conn.query_row("SELECT 1", params![], |_| Ok(()))
        .context("Failed to test database connection")?;
    Ok(())
}

pub fn init_schema(pool: &SqlitePool) -> Result<()> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            likes_count INTEGER NOT NULL DEFAULT 0 CHECK (likes_count >= 0),
            comments_count INTEGER NOT NULL DEFAULT 0 CHECK (comments_count >= 0)
        )
        "#,
        params![],
    )
    .context("Failed to create posts table")?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            username TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        params![],
    )
    .context("Failed to create comments table")?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            username TEXT NOT NULL,
            liked_at TEXT NOT NULL,
            PRIMARY KEY (post_id, username)
        )
        "#,
        params![],
    )
    .context("Failed to create likes table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)",
        params![],
    )
    .context("Failed to create posts created_at index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id, created_at)",
        params![],
    )
    .context("Failed to create comments post_id index")?;

    Ok(())
}
