//! Cache pruner: FIFO eviction down to a retention cap

use crate::config::Config;
use crate::error::Result;
use crate::types::PruneReport;
use image_cache_db::{CachedImage, ImageStore};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Evict the oldest records until at most `max_items` remain.
///
/// `max_items == 0` clears the cache.
pub async fn prune(config: &Config, max_items: usize) -> Result<PruneReport> {
    let store = ImageStore::open(&config.db_path).await?;
    prune_store(&store, max_items).await
}

/// Prune to the configured cap minus the per-cycle fetch count, so the
/// prefetch that runs alongside does not immediately overshoot. Skipped when
/// the fetch count exceeds the cap.
pub async fn prune_with_headroom(config: &Config) -> Result<PruneReport> {
    match config.headroom_cap() {
        Some(cap) => prune(config, cap).await,
        None => {
            debug!(
                max_cached_images = config.max_cached_images,
                photos_to_fetch = config.photos_to_fetch,
                "Fetch count exceeds cache cap, skipping prune"
            );
            Ok(PruneReport::skipped())
        }
    }
}

/// Drop every cached image
pub async fn clear_all(config: &Config) -> Result<PruneReport> {
    prune(config, 0).await
}

pub async fn prune_store(store: &ImageStore, max_items: usize) -> Result<PruneReport> {
    let images = store.list_all().await?;
    let before = images.len();

    let targets = eviction_targets(&images, max_items);
    if targets.is_empty() {
        debug!(entries = before, max_items, "Cache within cap");
        return Ok(PruneReport {
            cap: Some(max_items),
            before,
            outcome: Default::default(),
        });
    }

    let outcome = store.delete_where(&targets).await?;
    if outcome.failed > 0 {
        warn!(
            deleted = outcome.deleted,
            failed = outcome.failed,
            max_items,
            "Prune left some images in place"
        );
    } else {
        info!(deleted = outcome.deleted, max_items, "Pruned image cache");
    }

    Ok(PruneReport {
        cap: Some(max_items),
        before,
        outcome,
    })
}

/// `created_at` of the `len - max_items` oldest images
pub fn eviction_targets(images: &[CachedImage], max_items: usize) -> HashSet<i64> {
    let excess = images.len().saturating_sub(max_items);
    if excess == 0 {
        return HashSet::new();
    }

    let mut keys: Vec<(i64, i64)> = images.iter().map(|i| (i.created_at, i.id)).collect();
    keys.sort_unstable();
    keys
        .into_iter()
        .take(excess)
        .map(|(created_at, _)| created_at)
        .collect()
}
