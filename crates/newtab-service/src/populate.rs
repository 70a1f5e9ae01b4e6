//! Cache populator: prefetch images into the store

use crate::config::Config;
use crate::error::{NewTabError, Result};
use crate::types::PopulateReport;
use futures::future::join_all;
use image_cache_db::{ImageStore, NewCachedImage};
use tracing::{debug, info, warn};
use unsplash_source::ImageSource;

/// Fetch one image from a validated source URL and cache it.
///
/// Rejects URLs outside the image source before any network call.
pub async fn add_image_to_store(
    config: &Config,
    source: &dyn ImageSource,
    url: &str,
) -> Result<i64> {
    config.source.validate(url)?;
    fetch_and_insert(config, source, url).await
}

/// Prefetch `count` images from `url`.
///
/// The URL is validated once up front. Each fetch+insert iteration then runs
/// independently; a failed iteration is logged and recorded in the report
/// without affecting its siblings.
pub async fn populate(
    config: &Config,
    source: &dyn ImageSource,
    url: &str,
    count: usize,
) -> Result<PopulateReport> {
    if let Err(e) = config.source.validate(url) {
        warn!(url = %url, "Refusing to populate from invalid source URL");
        return Err(e.into());
    }

    let iterations = (0..count).map(|iteration| async move {
        let result = fetch_and_insert(config, source, url).await;
        if let Err(ref e) = result {
            warn!(iteration, url = %url, error = %e, "Populate iteration failed");
        }
        result
    });
    let results = join_all(iterations).await;

    let report = PopulateReport {
        url: url.to_string(),
        results,
    };
    info!(
        url = %url,
        inserted = report.inserted(),
        failed = report.failed(),
        "Populate cycle finished"
    );
    Ok(report)
}

async fn fetch_and_insert(config: &Config, source: &dyn ImageSource, url: &str) -> Result<i64> {
    let image_data = source.fetch_image(url).await.map_err(NewTabError::from)?;

    let store = ImageStore::open(&config.db_path).await?;
    let id = store.insert(&NewCachedImage::now(image_data)).await?;

    debug!(id, "Prefetched image");
    Ok(id)
}
