//! Unsplash New Tab service
//!
//! Keeps a small local cache of Unsplash photos and shows one of them as the
//! background of every new tab. Each new tab fires three independent tasks:
//! render a background, prefetch replacements, and prune the cache.

pub mod config;
pub mod error;
pub mod newtab;
pub mod page;
pub mod populate;
pub mod preferences;
pub mod prune;
pub mod render;
pub mod select;
pub mod server;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{NewTabError, Result};
pub use newtab::{apply_preferences, open_new_tab, NewTabContext, NewTabTasks, PreferencesUpdate};
pub use populate::{add_image_to_store, populate};
pub use preferences::{JsonPreferencesStore, MemoryPreferencesStore, PreferencesStore};
pub use prune::{clear_all, prune, prune_with_headroom};
pub use render::{PageRenderer, PageView, RenderTarget};
pub use select::select_and_render;
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::*;
