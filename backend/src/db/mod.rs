//! Database connection and operations

pub mod colors;
pub mod fruits;
pub mod schema_sync;
pub mod seed;

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::AppError;

pub use colors::{ColorRepository, CreateColor};
pub use fruits::{CreateFruit, FruitRepository};
pub use schema_sync::sync_all_entity_schemas;
pub use seed::run_seeds;

/// Longest accepted color or fruit name, in characters.
pub const NAME_MAX_LENGTH: usize = 20;

/// Trim and check a name against the column limits.
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }
    if trimmed.chars().count() > NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            NAME_MAX_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true))
    }

    /// Create a new database connection pool with retry logic.
    /// Retries every `retry_interval` until `timeout` has elapsed.
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retry_interval: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let options = Self::connect_options(url)?;
        let deadline = Instant::now() + timeout;
        loop {
            match SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => return Ok(Self { pool }),
                Err(e) if Instant::now() + retry_interval < deadline => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(retry_interval).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to connect to {} within {:?}", url, timeout)
                    });
                }
            }
        }
    }

    /// Single-connection in-memory database.
    ///
    /// The connection is never recycled, since an in-memory database lives
    /// only as long as its connection.
    #[cfg(test)]
    pub async fn connect_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(Self::connect_options("sqlite::memory:")?)
            .await?;
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query, used by the readiness check
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
    }

    /// Get a colors repository
    pub fn colors(&self) -> ColorRepository {
        ColorRepository::new(self.pool.clone())
    }

    /// Get a fruits repository
    pub fn fruits(&self) -> FruitRepository {
        FruitRepository::new(self.pool.clone())
    }
}

/// In-memory database with the schema synced and demo data seeded.
#[cfg(test)]
pub async fn test_database() -> Database {
    let db = Database::connect_memory().await.unwrap();
    let sync = sync_all_entity_schemas(db.pool()).await;
    assert!(sync.errors.is_empty(), "{:?}", sync.errors);
    run_seeds(db.pool()).await.unwrap();
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  kiwi ").unwrap(), "kiwi");
        assert_matches!(validate_name("   "), Err(AppError::Validation(_)));
        assert_matches!(
            validate_name("a very long fruit name indeed"),
            Err(AppError::Validation(msg)) if msg.contains("20")
        );
        // Characters, not bytes
        assert!(validate_name(&"é".repeat(20)).is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = test_database().await;
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        let result = Database::connect_with_retry(
            "sqlite:///nonexistent-dir/fruits.db",
            1,
            Duration::from_millis(10),
            Duration::from_millis(30),
        )
        .await;
        assert!(result.is_err());
    }
}
