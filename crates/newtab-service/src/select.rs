//! Background selector: pick a cached image, or fall back to a live fetch

use crate::config::Config;
use crate::error::{NewTabError, Result};
use crate::render::RenderTarget;
use crate::types::Selection;
use image_cache_db::{CachedImage, ImageStore};
use rand::Rng;
use tracing::{debug, error, info, warn};
use unsplash_source::ImageSource;

/// Render one background for a new tab.
///
/// With a non-empty cache, one record is chosen uniformly at random and the
/// overlay is hidden once it is shown. With an empty cache the overlay is
/// shown while `fallback_url` is fetched live; it is hidden again only after
/// that image has rendered. If the fallback fetch fails nothing is rendered,
/// the overlay stays up and the error is returned.
///
/// An unreadable store is treated like an empty one, so the tab still gets a
/// live image; the store error comes back in [`Selection::Fallback`].
pub async fn select_and_render(
    config: &Config,
    source: &dyn ImageSource,
    target: &dyn RenderTarget,
    fallback_url: &str,
) -> Result<Selection> {
    let (images, store_error) = match load_cached(config).await {
        Ok(images) => (images, None),
        Err(e) => {
            warn!(error = %e, "Image cache unavailable, falling back to a live fetch");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let chosen = {
        let mut rng = rand::thread_rng();
        pick_random(&images, &mut rng).cloned()
    };

    if let Some(image) = chosen {
        debug!(
            id = image.id,
            cached = images.len(),
            "Rendering cached image"
        );
        target.set_background(&image.image_data).await;
        target.hide_overlay().await;
        return Ok(Selection::Cached { id: image.id });
    }

    info!(url = %fallback_url, "Image cache empty, fetching fallback");
    target.show_overlay().await;

    match source.fetch_image(fallback_url).await {
        Ok(image_data) => {
            target.set_background(&image_data).await;
            target.hide_overlay().await;
            Ok(Selection::Fallback { store_error })
        }
        Err(e) => {
            error!(url = %fallback_url, error = %e, "Fallback fetch failed, no background set");
            Err(NewTabError::from(e))
        }
    }
}

/// Uniform pick over `images`
pub fn pick_random<'a, R: Rng + ?Sized>(
    images: &'a [CachedImage],
    rng: &mut R,
) -> Option<&'a CachedImage> {
    if images.is_empty() {
        return None;
    }
    images.get(rng.gen_range(0..images.len()))
}

async fn load_cached(config: &Config) -> Result<Vec<CachedImage>> {
    let store = ImageStore::open(&config.db_path).await?;
    Ok(store.list_all().await?)
}
