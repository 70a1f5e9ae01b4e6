//! Handle to the image cache database

use crate::error::Result;
use crate::images;
use crate::migrate::migrate;
use crate::types::{CacheStats, CachedImage, DeleteOutcome, NewCachedImage};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 4;

/// An open image cache.
///
/// Cheap to clone. Independent operations are expected to open their own
/// handle; opening is idempotent and safe to run concurrently.
#[derive(Clone)]
pub struct ImageStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl ImageStore {
    /// Open the cache at `path`, creating the file and schema if absent
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        migrate(&pool).await?;
        debug!(path = ?path, "Image cache opened");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Append a record; never overwrites an existing one
    pub async fn insert(&self, image: &NewCachedImage) -> Result<i64> {
        let id = images::insert(&self.pool, image).await?;
        debug!(id, created_at = image.created_at, "Cached image");
        Ok(id)
    }

    /// Every record. Ordered by key, which callers must not treat as
    /// chronological.
    pub async fn list_all(&self) -> Result<Vec<CachedImage>> {
        Ok(images::list_all(&self.pool).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(images::count(&self.pool).await?)
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(images::stats(&self.pool).await?)
    }

    /// Delete every record whose `created_at` is in `targets`.
    ///
    /// Sweeps the table and deletes matches one at a time. A failed delete is
    /// logged and counted; deletions already applied stay applied.
    pub async fn delete_where(&self, targets: &HashSet<i64>) -> Result<DeleteOutcome> {
        let mut outcome = DeleteOutcome::default();
        if targets.is_empty() {
            return Ok(outcome);
        }

        let keys = images::list_keys(&self.pool).await?;

        for (id, created_at) in keys {
            if !targets.contains(&created_at) {
                continue;
            }
            outcome.matched += 1;

            match images::delete_by_id(&self.pool, id).await {
                Ok(true) => outcome.deleted += 1,
                Ok(false) => debug!(id, "Image already deleted"),
                Err(e) => {
                    warn!(id, created_at, error = %e, "Failed to delete cached image");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
