use crate::types::{CacheStats, CachedImage, NewCachedImage};
use sqlx::sqlite::SqlitePool;

/// Append an image, returning its assigned id.
///
/// The stored `created_at` is raised past the newest existing record when
/// needed, so timestamps stay unique and increase with insertion order.
pub async fn insert(pool: &SqlitePool, image: &NewCachedImage) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO images (created_at, image_data)
        SELECT MAX(?1, COALESCE(MAX(created_at) + 1, ?1)), ?2
        FROM images
        "#,
    )
    .bind(image.created_at)
    .bind(&image.image_data)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Every cached image, in key order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<CachedImage>, sqlx::Error> {
    sqlx::query_as::<_, CachedImage>(
        "SELECT id, created_at, image_data FROM images ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
}

/// `(id, created_at)` for every record, without the payloads
pub async fn list_keys(pool: &SqlitePool) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT id, created_at FROM images ORDER BY id ASC")
        .fetch_all(pool)
        .await
}

/// Delete one record by id; false if it was already gone
pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM images WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn stats(pool: &SqlitePool) -> Result<CacheStats, sqlx::Error> {
    sqlx::query_as::<_, CacheStats>(
        r#"
        SELECT
            COUNT(*) AS entries,
            MIN(created_at) AS oldest_created_at,
            MAX(created_at) AS newest_created_at,
            COALESCE(SUM(LENGTH(image_data)), 0) AS total_bytes
        FROM images
        "#,
    )
    .fetch_one(pool)
    .await
}
