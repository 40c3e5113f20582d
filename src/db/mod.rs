pub mod backend;
pub mod instrumented;
pub mod schema;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseKind};

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

pub use backend::{DatabaseBackend, LikeOutcome};
pub use instrumented::InstrumentedDatabase;

/// Database connection type - polymorphic over backends
pub type Database = Arc<dyn DatabaseBackend>;

/// Initialize the backend named by `DATABASE_URL`, wrapped with query metrics
pub async fn init_database(config: &DatabaseConfig) -> Result<Database> {
    let backend = match config.kind()? {
        DatabaseKind::Sqlite { path } => init_sqlite(&path, config)?,
        DatabaseKind::Postgres { url } => init_postgres(&url, config).await?,
    };
    Ok(Arc::new(InstrumentedDatabase::new(backend)) as Database)
}

#[cfg(feature = "sqlite")]
fn init_sqlite(path: &str, config: &DatabaseConfig) -> Result<Database> {
    tracing::info!(path = %path, "Initializing SQLite backend");
    let pool = sqlite::connection::create_pool(path, config)?;
    let backend = SqliteBackend::new(pool)?;
    Ok(Arc::new(backend) as Database)
}

#[cfg(not(feature = "sqlite"))]
fn init_sqlite(_path: &str, _config: &DatabaseConfig) -> Result<Database> {
    anyhow::bail!("DATABASE_URL names a SQLite database but the `sqlite` feature is disabled")
}

#[cfg(feature = "postgres")]
async fn init_postgres(url: &str, config: &DatabaseConfig) -> Result<Database> {
    tracing::info!("Initializing PostgreSQL backend");
    let pool = postgres::connection::create_pool(url, config).await?;
    postgres::connection::test_connection(&pool).await?;
    schema::run_migrations(&pool).await?;
    Ok(Arc::new(PostgresBackend::new(pool)) as Database)
}

#[cfg(not(feature = "postgres"))]
async fn init_postgres(_url: &str, _config: &DatabaseConfig) -> Result<Database> {
    anyhow::bail!("DATABASE_URL names a PostgreSQL database but the `postgres` feature is disabled")
}
