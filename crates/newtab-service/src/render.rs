//! Render target for the new-tab page
//!
//! The page has two slots: a background image and an informational text
//! overlay. A new background replaces the old element outright; it is
//! inserted transparent and fades to visible once loaded.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// DOM id of the background image slot
pub const BACKGROUND_IMAGE_ID: &str = "background-image";
/// DOM id of the informational text overlay
pub const TEXT_ID: &str = "default-copy";

#[async_trait]
pub trait RenderTarget: Send + Sync {
    /// Replace the background. Resolves once the image has loaded and is
    /// visible.
    async fn set_background(&self, image: &str);
    /// Remove the background element, if any
    async fn clear(&self);
    async fn show_overlay(&self);
    async fn hide_overlay(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Opacity {
    Transparent,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackgroundElement {
    pub image: String,
    pub opacity: Opacity,
}

/// Snapshot of what the page currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub background: Option<BackgroundElement>,
    pub overlay_visible: bool,
    /// Bumped every time the background element is replaced or removed
    pub generation: u64,
}

/// In-memory page, rendered to HTML by [`crate::page`]
#[derive(Default)]
pub struct PageRenderer {
    view: RwLock<PageView>,
}

impl PageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn view(&self) -> PageView {
        self.view.read().await.clone()
    }
}

#[async_trait]
impl RenderTarget for PageRenderer {
    async fn set_background(&self, image: &str) {
        let generation = {
            let mut view = self.view.write().await;
            view.generation += 1;
            view.background = Some(BackgroundElement {
                image: image.to_string(),
                opacity: Opacity::Transparent,
            });
            view.generation
        };

        // Data URIs decode in-process, so the load event fires right away.
        // A newer element inserted in between keeps its own transition.
        let mut view = self.view.write().await;
        if view.generation == generation {
            if let Some(background) = view.background.as_mut() {
                background.opacity = Opacity::Visible;
            }
        }
        debug!(generation, "Background rendered");
    }

    async fn clear(&self) {
        let mut view = self.view.write().await;
        view.generation += 1;
        view.background = None;
    }

    async fn show_overlay(&self) {
        self.view.write().await.overlay_visible = true;
    }

    async fn hide_overlay(&self) {
        self.view.write().await.overlay_visible = false;
    }
}
