use std::path::{Path, PathBuf};

use cheerleader_client::offline::OfflineCache;
use cheerleader_models::Track;
use snafu::ResultExt;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::debug;

use crate::{
    Result,
    error::{CreateDirectorySnafu, DatabaseSnafu, MigrationSnafu, PlaylistFormatSnafu},
    playlist::Playlist,
};

const DEFAULT_VOLUME: f32 = 1.0;

/// Local persistence: player settings, last playlist and the offline
/// response cache of the client.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("cheerleader").join("cheerleader.db"))
    }

    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(CreateDirectorySnafu { path: parent })?;
        }

        debug!(path = %path.display(), "opening database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .context(DatabaseSnafu)?;

        Self::init(pool).await
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context(DatabaseSnafu)?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        // The offline cache keeps its own migrations in the same table.
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(true);
        migrator.run(&pool).await.context(MigrationSnafu)?;

        Ok(Self { pool })
    }

    pub async fn offline_cache(&self) -> Result<OfflineCache> {
        Ok(OfflineCache::new(self.pool.clone()).await?)
    }

    pub async fn volume(&self) -> Result<f32> {
        let volume: Option<f64> =
            sqlx::query_scalar("SELECT volume FROM configuration WHERE id = 0")
                .fetch_optional(&self.pool)
                .await
                .context(DatabaseSnafu)?;

        Ok(volume.map(|v| v as f32).unwrap_or(DEFAULT_VOLUME))
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        sqlx::query(
            "INSERT INTO configuration (id, volume) VALUES (0, ?1)
             ON CONFLICT(id) DO UPDATE SET volume = excluded.volume",
        )
        .bind(volume as f64)
        .execute(&self.pool)
        .await
        .context(DatabaseSnafu)?;

        Ok(())
    }

    pub async fn playlist(&self) -> Result<Playlist> {
        let row: Option<(Option<i64>, String)> =
            sqlx::query_as("SELECT current_index, tracks FROM playlist WHERE id = 0")
                .fetch_optional(&self.pool)
                .await
                .context(DatabaseSnafu)?;

        let Some((current_index, tracks)) = row else {
            return Ok(Playlist::new());
        };

        let tracks: Vec<Track> = serde_json::from_str(&tracks).context(PlaylistFormatSnafu)?;
        let current_index = current_index.and_then(|index| usize::try_from(index).ok());

        Ok(Playlist::restore(tracks, current_index))
    }

    pub async fn set_playlist(&self, playlist: &Playlist) -> Result<()> {
        let tracks = serde_json::to_string(playlist.tracks()).context(PlaylistFormatSnafu)?;
        let current_index = playlist.current_index().map(|index| index as i64);

        sqlx::query(
            "INSERT INTO playlist (id, current_index, tracks) VALUES (0, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET current_index = excluded.current_index, tracks = excluded.tracks",
        )
        .bind(current_index)
        .bind(tracks)
        .execute(&self.pool)
        .await
        .context(DatabaseSnafu)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cheerleader_models::Track;

    use super::Database;
    use crate::playlist::Playlist;

    #[tokio::test]
    async fn volume_defaults_and_persists() {
        let database = Database::in_memory().await.unwrap();

        assert_eq!(database.volume().await.unwrap(), 1.0);

        database.set_volume(0.25).await.unwrap();
        assert_eq!(database.volume().await.unwrap(), 0.25);
    }

    #[tokio::test]
    async fn playlist_round_trips_with_cursor() {
        let database = Database::in_memory().await.unwrap();
        assert!(database.playlist().await.unwrap().is_empty());

        let mut playlist = Playlist::from_tracks(
            (1..=3)
                .map(|id| Track {
                    id,
                    title: format!("track {id}"),
                    ..Default::default()
                })
                .collect(),
        );
        playlist.skip_to(2);

        database.set_playlist(&playlist).await.unwrap();
        assert_eq!(database.playlist().await.unwrap(), playlist);

        database.set_playlist(&Playlist::new()).await.unwrap();
        assert_eq!(database.playlist().await.unwrap(), Playlist::new());
    }

    #[tokio::test]
    async fn offline_cache_shares_the_database() {
        let database = Database::in_memory().await.unwrap();
        let offline_cache = database.offline_cache().await.unwrap();

        offline_cache.save("https://api/users/1", "{}").await.unwrap();

        let again = database.offline_cache().await.unwrap();
        assert_eq!(again.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn both_schemas_share_one_migration_history() {
        let database = Database::in_memory().await.unwrap();
        database.offline_cache().await.unwrap();
        database.offline_cache().await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&database.pool)
            .await
            .unwrap();
        assert_eq!(applied, 2);

        database.set_volume(0.5).await.unwrap();
        assert_eq!(database.volume().await.unwrap(), 0.5);
    }
}
