// src/store/sqlite.rs

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::KvStore;
use crate::error::AppError;

/// Slot store backed by the `kv_slots` table.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `kv_slots` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read slot '{}': {:?}", key, e);
                AppError::from(e)
            })?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_slots (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write slot '{}': {:?}", key, e);
            AppError::from(e)
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_absent_slot_reads_none() {
        let store = SqliteKvStore::new(memory_pool().await);
        store.migrate().await.unwrap();

        assert_eq!(store.get("scores").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_value() {
        let store = SqliteKvStore::new(memory_pool().await);
        store.migrate().await.unwrap();

        store.set("scores", "[]").await.unwrap();
        store.set("scores", r#"[{"score":1}]"#).await.unwrap();

        assert_eq!(
            store.get("scores").await.unwrap().as_deref(),
            Some(r#"[{"score":1}]"#)
        );
    }

    #[tokio::test]
    async fn test_unmigrated_table_is_storage_failure() {
        let store = SqliteKvStore::new(memory_pool().await);

        let err = store.get("scores").await.unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}
