use std::path::Path;

use snafu::ResultExt;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use time::OffsetDateTime;

use crate::{
    Result,
    error::{MigrationSnafu, OfflineCacheSnafu},
};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CachedResponse {
    pub url: String,
    pub body: String,
    /// Unix timestamp, in seconds, of the last successful response.
    pub updated_at: i64,
}

/// Last successful response body of every request url.
///
/// One row per url, each save overwrites the previous one. Rows never expire.
#[derive(Debug, Clone)]
pub struct OfflineCache {
    pool: SqlitePool,
}

impl OfflineCache {
    /// Wraps `pool`, applying the offline cache migrations first.
    ///
    /// The pool may be shared with other migrated schemas: migrations this
    /// crate does not ship are left alone.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(true);
        migrator.run(&pool).await.context(MigrationSnafu)?;

        Ok(Self { pool })
    }

    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .context(OfflineCacheSnafu)?;

        Self::new(pool).await
    }

    pub async fn in_memory() -> Result<Self> {
        // Every connection to `sqlite::memory:` opens its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context(OfflineCacheSnafu)?;

        Self::new(pool).await
    }

    pub async fn save(&self, url: &str, body: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        sqlx::query(
            "INSERT INTO offline_cache (url, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        )
        .bind(url)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await
        .context(OfflineCacheSnafu)?;

        Ok(())
    }

    pub async fn get(&self, url: &str) -> Result<Option<CachedResponse>> {
        sqlx::query_as::<_, CachedResponse>(
            "SELECT url, body, updated_at FROM offline_cache WHERE url = ?1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .context(OfflineCacheSnafu)
    }

    pub async fn remove(&self, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offline_cache WHERE url = ?1")
            .bind(url)
            .execute(&self.pool)
            .await
            .context(OfflineCacheSnafu)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM offline_cache")
            .execute(&self.pool)
            .await
            .context(OfflineCacheSnafu)?;

        Ok(result.rows_affected())
    }

    pub async fn len(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM offline_cache")
            .fetch_one(&self.pool)
            .await
            .context(OfflineCacheSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::OfflineCache;

    #[tokio::test]
    async fn save_overwrites_previous_body() {
        let cache = OfflineCache::in_memory().await.unwrap();

        cache.save("https://api/users/1", "{\"v\":1}").await.unwrap();
        cache.save("https://api/users/1", "{\"v\":2}").await.unwrap();

        let cached = cache.get("https://api/users/1").await.unwrap().unwrap();
        assert_eq!(cached.body, "{\"v\":2}");
        assert!(cached.updated_at > 0);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_url_is_none() {
        let cache = OfflineCache::in_memory().await.unwrap();

        assert_eq!(cache.get("https://api/tracks/9").await.unwrap(), None);
        assert!(!cache.remove("https://api/tracks/9").await.unwrap());
    }

    #[tokio::test]
    async fn clear_removes_every_row() {
        let cache = OfflineCache::in_memory().await.unwrap();

        cache.save("a", "1").await.unwrap();
        cache.save("b", "2").await.unwrap();
        assert!(cache.remove("a").await.unwrap());

        assert_eq!(cache.clear().await.unwrap(), 1);
        assert_eq!(cache.len().await.unwrap(), 0);
    }
}
