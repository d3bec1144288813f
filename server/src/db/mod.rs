use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::user_store::UserStore;

/// URL for a private in-memory database, used by tests and local runs.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Open the profile database and create the `users` table.
///
/// Accepts `sqlite::memory:` or a file URL such as `sqlite:./data/befriend.db`;
/// missing parent directories and the file itself are created.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = if database_url == IN_MEMORY_URL {
        // every connection to :memory: is a separate database
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?
    } else {
        let file_path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        let abs_path = std::env::current_dir()?.join(file_path);
        if let Some(parent) = abs_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        SqlitePoolOptions::new()
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&abs_path)
                    .create_if_missing(true),
            )
            .await?
    };

    UserStore::new(pool.clone())
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("user store migration failed: {e}"))?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory_is_migrated() {
        let pool = connect(IN_MEMORY_URL).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("befriend.db");
        let url = format!("sqlite:{}", db_path.display());

        let pool = connect(&url).await.unwrap();
        assert!(db_path.exists());

        // reconnecting to an existing database is fine
        drop(pool);
        connect(&url).await.unwrap();
    }
}
