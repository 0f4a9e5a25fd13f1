pub mod models;
pub mod users;
pub mod notes;

pub use models::{User, Note};
pub use users::UserRepository;
pub use notes::NoteRepository;

use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::error::AppError;

pub async fn connect(config: &Config) -> Result<Pool<Sqlite>, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// A migrated pool over a private in-memory database.
///
/// Pinned to a single connection that never recycles, since every new
/// `sqlite::memory:` connection would open an empty database.
pub async fn memory_pool() -> Result<Pool<Sqlite>, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Pool<Sqlite> {
    memory_pool().await.expect("in-memory database")
}
