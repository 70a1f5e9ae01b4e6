//! Fakes shared by the unit tests

use crate::config::Config;
use crate::render::RenderTarget;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use unsplash_source::{ImageSource, SourceError};

pub fn test_config(dir: &Path) -> Config {
    Config {
        db_path: dir.join("images.db"),
        preferences_path: dir.join("preferences.json"),
        ..Config::default()
    }
}

fn unavailable(url: &str) -> SourceError {
    SourceError::Status {
        status: 503,
        url: url.to_string(),
    }
}

/// Returns the same image (or the same failure) on every call
pub struct StaticSource {
    image: Option<String>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn ok(image: &str) -> Self {
        Self {
            image: Some(image.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSource for StaticSource {
    async fn fetch_image(&self, url: &str) -> unsplash_source::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image.clone().ok_or_else(|| unavailable(url))
    }
}

/// Fails every second call
pub struct FlakySource {
    image: String,
    calls: AtomicUsize,
}

impl FlakySource {
    pub fn new(image: &str) -> Self {
        Self {
            image: image.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageSource for FlakySource {
    async fn fetch_image(&self, url: &str) -> unsplash_source::Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
            return Err(unavailable(url));
        }
        Ok(self.image.clone())
    }
}

/// Records every render call in order
#[derive(Default)]
pub struct RecordingTarget {
    events: Mutex<Vec<String>>,
}

impl RecordingTarget {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RenderTarget for RecordingTarget {
    async fn set_background(&self, image: &str) {
        self.push(format!("set_background:{}", image));
    }

    async fn clear(&self) {
        self.push("clear".to_string());
    }

    async fn show_overlay(&self) {
        self.push("show_overlay".to_string());
    }

    async fn hide_overlay(&self) {
        self.push("hide_overlay".to_string());
    }
}
