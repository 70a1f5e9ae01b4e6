use sqlx::sqlite::SqlitePool;
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

/// Schema version recorded in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Bring the schema up to [`SCHEMA_VERSION`].
///
/// Runs under `BEGIN IMMEDIATE`, so concurrent openers serialize on the
/// write lock and only the first one to see an old version creates the table.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;

    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    let result = match upgrade(&mut conn).await {
        Ok(()) => sqlx::query("COMMIT").execute(&mut *conn).await.map(|_| ()),
        Err(e) => Err(e),
    };

    // A connection must never go back to the pool mid-transaction
    if let Err(e) = &result {
        warn!(error = %e, "Schema upgrade failed, rolling back");
        if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
            warn!(error = %rollback, "Rollback failed, discarding connection");
            if let Err(close) = conn.detach().close().await {
                debug!(error = %close, "Failed to close discarded connection");
            }
        }
    }

    result
}

/// Current schema version of the database behind `pool`
pub async fn schema_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

async fn upgrade(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await?;

    if version >= SCHEMA_VERSION {
        debug!(version, "Image cache schema is current");
        return Ok(());
    }

    info!(
        from = version,
        to = SCHEMA_VERSION,
        "Upgrading image cache schema"
    );

    if version < 1 {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                image_data TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
    }

    let set_version = format!("PRAGMA user_version = {}", SCHEMA_VERSION);
    sqlx::query(&set_version).execute(&mut *conn).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_failed_upgrade_leaves_no_open_transaction() {
        let dir = tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("images.db"))
            .create_if_missing(true)
            .pragma("query_only", "ON");
        // One connection, so the next acquire gets the same one back
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        assert!(migrate(&pool).await.is_err());
        assert_eq!(schema_version(&pool).await.unwrap(), 0);

        // Fails with "cannot start a transaction within a transaction" if the
        // upgrade's transaction leaked back into the pool
        sqlx::query("BEGIN").execute(&pool).await.unwrap();
        sqlx::query("ROLLBACK").execute(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let dir = tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("images.db"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }
}
