use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A cached background image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CachedImage {
    pub id: i64,
    /// Insertion time, epoch milliseconds
    pub created_at: i64,
    /// Self-contained `data:` URI
    pub image_data: String,
}

/// Insert payload; the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCachedImage {
    pub created_at: i64,
    pub image_data: String,
}

impl NewCachedImage {
    /// Stamp an image with the current time
    pub fn now(image_data: impl Into<String>) -> Self {
        Self {
            created_at: chrono::Utc::now().timestamp_millis(),
            image_data: image_data.into(),
        }
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CacheStats {
    pub entries: i64,
    pub oldest_created_at: Option<i64>,
    pub newest_created_at: Option<i64>,
    pub total_bytes: i64,
}

/// Result of a multi-record delete sweep.
///
/// Deletions are applied one record at a time; `failed` counts records whose
/// delete statement errored and were left in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub matched: usize,
    pub deleted: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.oldest_created_at.is_none());
        assert!(stats.newest_created_at.is_none());
    }

    #[test]
    fn test_new_cached_image_now() {
        let before = chrono::Utc::now().timestamp_millis();
        let image = NewCachedImage::now("data:image/png;base64,AA==");
        let after = chrono::Utc::now().timestamp_millis();

        assert!(image.created_at >= before && image.created_at <= after);
        assert_eq!(image.image_data, "data:image/png;base64,AA==");
    }

    #[test]
    fn test_cached_image_serialization() {
        let image = CachedImage {
            id: 3,
            created_at: 1_700_000_000_000,
            image_data: "data:image/jpeg;base64,/9j/".to_string(),
        };

        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"createdAt\":1700000000000"));
        assert!(json.contains("\"imageData\""));

        let back: CachedImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }
}
