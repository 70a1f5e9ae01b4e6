//! New-tab orchestration
//!
//! Each new tab fires three independent tasks: render a background, prefetch
//! replacements, and prune the cache. None waits on another; the pruner may
//! run before, during or after the prefetch inserts.

use crate::config::Config;
use crate::error::{NewTabError, Result};
use crate::populate::populate;
use crate::preferences::{JsonPreferencesStore, PreferencesStore};
use crate::prune::{clear_all, prune_with_headroom};
use crate::render::RenderTarget;
use crate::select::select_and_render;
use crate::types::{NewTabReport, PopulateReport, PruneReport, Selection};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};
use unsplash_source::{ImageFetcher, ImageSource, Preferences};

/// Everything a new-tab event needs
#[derive(Clone)]
pub struct NewTabContext {
    pub config: Arc<Config>,
    pub source: Arc<dyn ImageSource>,
    pub preferences: Arc<dyn PreferencesStore>,
}

impl NewTabContext {
    pub fn new(
        config: Config,
        source: Arc<dyn ImageSource>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            preferences,
        }
    }

    /// Live HTTP fetcher and JSON preferences at the configured path
    pub fn from_config(config: Config) -> Self {
        let preferences = Arc::new(JsonPreferencesStore::new(config.preferences_path.clone()));
        Self::new(config, Arc::new(ImageFetcher::new()), preferences)
    }

    /// Preferences, or the defaults if they cannot be read
    pub async fn current_preferences(&self) -> Preferences {
        self.preferences.get().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read preferences, using defaults");
            Preferences::default()
        })
    }
}

/// Handles to the three tasks of one new-tab event
pub struct NewTabTasks {
    pub render: JoinHandle<Result<Selection>>,
    pub populate: JoinHandle<Result<PopulateReport>>,
    pub prune: JoinHandle<Result<PruneReport>>,
}

impl NewTabTasks {
    /// Wait for all three tasks
    pub async fn join(self) -> NewTabReport {
        let (selection, populate, prune) = tokio::join!(self.render, self.populate, self.prune);
        NewTabReport {
            selection: flatten(selection),
            populate: flatten(populate),
            prune: flatten(prune),
        }
    }
}

fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.map_err(NewTabError::from).and_then(|result| result)
}

/// Fire the render, populate and prune tasks for one new tab.
///
/// Must be called from within a tokio runtime.
pub fn open_new_tab(ctx: &NewTabContext, target: Arc<dyn RenderTarget>) -> NewTabTasks {
    let render = {
        let ctx = ctx.clone();
        let fallback_url = ctx.config.source.random();
        tokio::spawn(async move {
            select_and_render(
                &ctx.config,
                ctx.source.as_ref(),
                target.as_ref(),
                &fallback_url,
            )
            .await
        })
    };

    let populate = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let prefs = ctx.current_preferences().await;
            let url = ctx.config.source.for_preferences(&prefs);
            populate(
                &ctx.config,
                ctx.source.as_ref(),
                &url,
                ctx.config.photos_to_fetch,
            )
            .await
        })
    };

    let prune = {
        let config = ctx.config.clone();
        tokio::spawn(async move { prune_with_headroom(&config).await })
    };

    NewTabTasks {
        render,
        populate,
        prune,
    }
}

/// Result of saving preferences
#[derive(Debug, Clone, Serialize)]
pub struct PreferencesUpdate {
    pub preferences: Preferences,
    pub changed: bool,
    /// Cache clear triggered by the change, if any
    pub cleared: Option<PruneReport>,
}

/// Save preferences, clearing the cache when they changed so images from the
/// previous source stop appearing.
pub async fn apply_preferences(
    ctx: &NewTabContext,
    preferences: Preferences,
) -> Result<PreferencesUpdate> {
    let current = ctx.preferences.get().await.ok();
    let changed = current.as_ref() != Some(&preferences);

    ctx.preferences.set(&preferences).await?;

    let cleared = if changed {
        let report = clear_all(&ctx.config).await?;
        info!(
            evicted = report.outcome.deleted,
            "Preferences changed, image cache cleared"
        );
        Some(report)
    } else {
        None
    };

    Ok(PreferencesUpdate {
        preferences,
        changed,
        cleared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferencesStore;
    use crate::render::PageRenderer;
    use crate::test_support::{test_config, StaticSource};
    use image_cache_db::{ImageStore, NewCachedImage};
    use tempfile::tempdir;
    use unsplash_source::SelectedContent;

    fn context(dir: &std::path::Path, source: StaticSource) -> (NewTabContext, Arc<StaticSource>) {
        let source = Arc::new(source);
        let ctx = NewTabContext::new(
            test_config(dir),
            source.clone(),
            Arc::new(MemoryPreferencesStore::default()),
        );
        (ctx, source)
    }

    #[tokio::test]
    async fn test_first_tab_falls_back_and_prefetches() {
        let dir = tempdir().unwrap();
        let (ctx, source) = context(dir.path(), StaticSource::ok("data:X"));
        let page = Arc::new(PageRenderer::new());

        let report = open_new_tab(&ctx, page.clone()).join().await;

        // The selector may or may not see a prefetched image, depending on
        // how the tasks interleave
        let selection = report.selection.unwrap();
        let fallback_fetches = usize::from(selection.is_fallback());
        assert_eq!(selection.store_error(), None);
        assert_eq!(report.populate.unwrap().inserted(), 2);
        assert!(report.prune.is_ok());
        assert_eq!(source.calls(), 2 + fallback_fetches);

        let view = page.view().await;
        assert_eq!(view.background.unwrap().image, "data:X");
        assert!(!view.overlay_visible);
    }

    #[tokio::test]
    async fn test_cache_stays_bounded_across_tabs() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path(), StaticSource::ok("data:X"));

        for _ in 0..6 {
            let report = open_new_tab(&ctx, Arc::new(PageRenderer::new()))
                .join()
                .await;
            assert!(report.selection.is_ok());
        }

        // A final prune after the last prefetch settles the cache at the cap
        crate::prune::prune(&ctx.config, ctx.config.max_cached_images)
            .await
            .unwrap();
        let store = ImageStore::open(&ctx.config.db_path).await.unwrap();
        let count = store.count().await.unwrap() as usize;
        assert!(count <= ctx.config.max_cached_images);
    }

    #[tokio::test]
    async fn test_populate_follows_preferences() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path(), StaticSource::ok("data:X"));
        ctx.preferences
            .set(&Preferences {
                use_random_photos: false,
                selected_content: SelectedContent::MyLikes,
                username: "jane".to_string(),
            })
            .await
            .unwrap();

        let report = open_new_tab(&ctx, Arc::new(PageRenderer::new()))
            .join()
            .await;
        let populate = report.populate.unwrap();
        assert_eq!(
            populate.url,
            "https://source.unsplash.com/user/jane/likes/1920x990"
        );
    }

    #[tokio::test]
    async fn test_unreachable_source_degrades_gracefully() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path(), StaticSource::failing());
        let page = Arc::new(PageRenderer::new());

        let report = open_new_tab(&ctx, page.clone()).join().await;

        assert!(matches!(
            report.selection,
            Err(NewTabError::FetchFailed(_))
        ));
        assert_eq!(report.populate.unwrap().failed(), 2);
        assert!(report.prune.is_ok());

        let view = page.view().await;
        assert!(view.background.is_none());
        assert!(view.overlay_visible);
    }

    #[tokio::test]
    async fn test_apply_preferences_clears_cache_on_change() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path(), StaticSource::ok("data:X"));
        let store = ImageStore::open(&ctx.config.db_path).await.unwrap();
        store
            .insert(&NewCachedImage::now("data:old"))
            .await
            .unwrap();

        let prefs = Preferences {
            use_random_photos: false,
            selected_content: SelectedContent::MyPhotos,
            username: "jane".to_string(),
        };
        let update = apply_preferences(&ctx, prefs.clone()).await.unwrap();

        assert!(update.changed);
        assert_eq!(update.cleared.unwrap().outcome.deleted, 1);
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(ctx.preferences.get().await.unwrap(), prefs);
    }

    #[tokio::test]
    async fn test_apply_same_preferences_keeps_cache() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path(), StaticSource::ok("data:X"));
        let store = ImageStore::open(&ctx.config.db_path).await.unwrap();
        store
            .insert(&NewCachedImage::now("data:old"))
            .await
            .unwrap();

        let update = apply_preferences(&ctx, Preferences::default())
            .await
            .unwrap();

        assert!(!update.changed);
        assert!(update.cleared.is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
