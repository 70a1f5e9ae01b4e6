use crate::error::{NewTabError, Result};
use std::env;
use std::path::PathBuf;
use unsplash_source::{Resolution, SourceUrls, DEFAULT_BASE_URL};

pub const MAX_CACHED_IMAGES: usize = 6;
pub const NUMBER_OF_PHOTOS_TO_FETCH: usize = 2;
pub const DEFAULT_SCREEN_WIDTH: u32 = 1920;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 1080;

/// Configuration passed explicitly to every component
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub preferences_path: PathBuf,
    /// Retention cap enforced by the pruner
    pub max_cached_images: usize,
    /// Images prefetched per new-tab event
    pub photos_to_fetch: usize,
    pub source: SourceUrls,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/unsplash-new-tab.db"),
            preferences_path: PathBuf::from("./data/preferences.json"),
            max_cached_images: MAX_CACHED_IMAGES,
            photos_to_fetch: NUMBER_OF_PHOTOS_TO_FETCH,
            source: SourceUrls::unsplash(Resolution::for_screen(
                DEFAULT_SCREEN_WIDTH,
                DEFAULT_SCREEN_HEIGHT,
            )),
            port: 3005,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let db_path = env::var("NEWTAB_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let preferences_path = env::var("NEWTAB_PREFERENCES_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.preferences_path);

        let max_cached_images = env::var("MAX_CACHED_IMAGES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_CACHED_IMAGES);

        let photos_to_fetch = env::var("NUMBER_OF_PHOTOS_TO_FETCH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(NUMBER_OF_PHOTOS_TO_FETCH);

        let width = env::var("SCREEN_WIDTH")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SCREEN_WIDTH);

        let height = env::var("SCREEN_HEIGHT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SCREEN_HEIGHT);

        let base_url =
            env::var("UNSPLASH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let source = SourceUrls::with_base_url(&base_url, Resolution::for_screen(width, height))
            .map_err(|e| NewTabError::Config(e.to_string()))?;

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        Ok(Self {
            db_path,
            preferences_path,
            max_cached_images,
            photos_to_fetch,
            source,
            port,
        })
    }

    /// Retention target that leaves room for the next prefetch, or `None`
    /// when the fetch count exceeds the cap
    pub fn headroom_cap(&self) -> Option<usize> {
        self.max_cached_images.checked_sub(self.photos_to_fetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_cached_images, 6);
        assert_eq!(config.photos_to_fetch, 2);
        assert_eq!(config.port, 3005);
        assert_eq!(config.source.resolution(), Resolution::new(1920, 990));
        assert_eq!(
            config.source.random(),
            "https://source.unsplash.com/random/1920x990"
        );
    }

    #[test]
    fn test_headroom_cap() {
        let config = Config::default();
        assert_eq!(config.headroom_cap(), Some(4));

        let tight = Config {
            max_cached_images: 1,
            photos_to_fetch: 2,
            ..Config::default()
        };
        assert_eq!(tight.headroom_cap(), None);
    }
}
