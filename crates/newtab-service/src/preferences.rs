//! Preferences store
//!
//! The core only reads preferences; the `configure` command and the
//! `PUT /preferences` route are the only writers.

use crate::error::{NewTabError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;
use unsplash_source::Preferences;

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Stored preferences, or the defaults when nothing has been saved
    async fn get(&self) -> Result<Preferences>;
    async fn set(&self, prefs: &Preferences) -> Result<()>;
}

/// Preferences persisted as a JSON file
pub struct JsonPreferencesStore {
    path: PathBuf,
}

impl JsonPreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PreferencesStore for JsonPreferencesStore {
    async fn get(&self) -> Result<Preferences> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No preferences saved, using defaults");
                return Ok(Preferences::default());
            }
            Err(e) => {
                return Err(NewTabError::Preferences(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            NewTabError::Preferences(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn set(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                NewTabError::Preferences(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(prefs)
            .map_err(|e| NewTabError::Preferences(e.to_string()))?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            NewTabError::Preferences(format!("failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(path = ?self.path, "Preferences saved");
        Ok(())
    }
}

/// In-process preferences
#[derive(Default)]
pub struct MemoryPreferencesStore {
    prefs: RwLock<Preferences>,
}

impl MemoryPreferencesStore {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs: RwLock::new(prefs),
        }
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn get(&self) -> Result<Preferences> {
        Ok(self.prefs.read().await.clone())
    }

    async fn set(&self, prefs: &Preferences) -> Result<()> {
        *self.prefs.write().await = prefs.clone();
        Ok(())
    }
}
