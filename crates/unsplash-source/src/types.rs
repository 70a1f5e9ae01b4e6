//! Preference and resolution types shared by the URL builder and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixels of browser chrome (tab strip, address bar) subtracted from the
/// screen height when requesting images.
pub const BROWSER_CHROME_HEIGHT: u32 = 90;

/// Which of a user's collections to draw images from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectedContent {
    #[default]
    MyLikes,
    MyPhotos,
}

impl SelectedContent {
    /// Human readable label, as shown on the popup
    pub fn label(self) -> &'static str {
        match self {
            SelectedContent::MyLikes => "liked photos",
            SelectedContent::MyPhotos => "photos",
        }
    }
}

/// User preferences controlling where images come from.
///
/// Missing keys fall back to their defaults when deserializing, so a partially
/// written preferences file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub use_random_photos: bool,
    pub selected_content: SelectedContent,
    pub username: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            use_random_photos: true,
            selected_content: SelectedContent::MyLikes,
            username: String::new(),
        }
    }
}

impl Preferences {
    /// A user collection is only targeted when random photos are off and a
    /// username has been configured.
    pub fn targets_user(&self) -> bool {
        !self.use_random_photos && !self.username.trim().is_empty()
    }
}

/// Target image resolution, rendered as `{width}x{height}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Resolution for a screen, leaving room for the browser chrome
    pub fn for_screen(width: u32, height: u32) -> Self {
        Self {
            width,
            height: height.saturating_sub(BROWSER_CHROME_HEIGHT),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = Preferences::default();
        assert!(prefs.use_random_photos);
        assert_eq!(prefs.selected_content, SelectedContent::MyLikes);
        assert_eq!(prefs.username, "");
        assert!(!prefs.targets_user());
    }

    #[test]
    fn test_preferences_serialization() {
        let prefs = Preferences {
            use_random_photos: false,
            selected_content: SelectedContent::MyPhotos,
            username: "jane".to_string(),
        };

        let json = serde_json::to_string(&prefs).unwrap();
        assert!(json.contains("\"useRandomPhotos\":false"));
        assert!(json.contains("\"selectedContent\":\"myPhotos\""));
        assert!(json.contains("\"username\":\"jane\""));
    }

    #[test]
    fn test_partial_preferences_use_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"username":"jane"}"#).unwrap();
        assert!(prefs.use_random_photos);
        assert_eq!(prefs.selected_content, SelectedContent::MyLikes);
        assert_eq!(prefs.username, "jane");
    }

    #[test]
    fn test_targets_user() {
        let mut prefs = Preferences {
            use_random_photos: false,
            selected_content: SelectedContent::MyLikes,
            username: "  ".to_string(),
        };
        assert!(!prefs.targets_user());

        prefs.username = "jane".to_string();
        assert!(prefs.targets_user());

        prefs.use_random_photos = true;
        assert!(!prefs.targets_user());
    }

    #[test]
    fn test_resolution_for_screen() {
        let res = Resolution::for_screen(1920, 1080);
        assert_eq!(res.to_string(), "1920x990");

        let tiny = Resolution::for_screen(50, 40);
        assert_eq!(tiny.height, 0);
    }

    #[test]
    fn test_selected_content_label() {
        assert_eq!(SelectedContent::MyLikes.label(), "liked photos");
        assert_eq!(SelectedContent::MyPhotos.label(), "photos");
    }
}
