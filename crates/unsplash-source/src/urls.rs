//! Image source URL contract
//!
//! Every fetch URL is derived from a base endpoint plus a target resolution.
//! URLs handed in from outside are checked against the host of that base
//! endpoint before anything is fetched.

use crate::error::{Result, SourceError};
use crate::types::{Preferences, Resolution, SelectedContent};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://source.unsplash.com";
const DEFAULT_HOST: &str = "source.unsplash.com";

const ONBOARDING_RESOLUTION: Resolution = Resolution {
    width: 900,
    height: 600,
};

/// Search topics for the onboarding example image
pub const ONBOARDING_TOPICS: &[&str] = &[
    "nature",
    "water",
    "mountain",
    "forest",
    "ocean",
    "beach",
    "city",
    "road",
    "sky",
    "cloud",
    "tree",
    "flower",
    "animal",
    "food",
    "coffee",
    "drink",
    "building",
    "architecture",
    "apartment",
    "music",
    "concert",
    "festival",
    "couple",
    "book",
    "magazine",
    "newspaper",
    "lake",
    "river",
    "sea",
    "sun",
    "moon",
    "star",
    "space",
    "universe",
    "galaxy",
];

/// Builds and validates URLs against one image source endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    base_url: String,
    allowed_host: String,
    resolution: Resolution,
}

impl SourceUrls {
    /// URLs for the public Unsplash Source endpoint
    pub fn unsplash(resolution: Resolution) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            allowed_host: DEFAULT_HOST.to_string(),
            resolution,
        }
    }

    /// URLs for a custom endpoint; only its host is accepted by [`Self::validate`]
    pub fn with_base_url(base_url: &str, resolution: Resolution) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let allowed_host = match parsed.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => {
                let msg = format!("{}: missing host", base_url);
                return Err(SourceError::InvalidUrl(msg));
            }
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            allowed_host,
            resolution,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    /// A random image at the configured resolution
    pub fn random(&self) -> String {
        format!("{}/random/{}", self.base_url, self.resolution)
    }

    /// The fetch URL selected by the user's preferences
    pub fn for_preferences(&self, prefs: &Preferences) -> String {
        if !prefs.targets_user() {
            return self.random();
        }

        let username = urlencoding::encode(prefs.username.trim());
        let url = match prefs.selected_content {
            SelectedContent::MyLikes => format!(
                "{}/user/{}/likes/{}",
                self.base_url, username, self.resolution
            ),
            SelectedContent::MyPhotos => {
                format!("{}/user/{}/{}", self.base_url, username, self.resolution)
            }
        };
        debug!(url = %url, "Built user collection URL");
        url
    }

    /// Example image for the onboarding page, over a shuffled topic list
    pub fn onboarding<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut topics = ONBOARDING_TOPICS.to_vec();
        topics.shuffle(rng);
        format!(
            "{}/random/{}?{}",
            self.base_url,
            ONBOARDING_RESOLUTION,
            topics.join(",")
        )
    }

    /// Check that `candidate` points at this source
    pub fn validate(&self, candidate: &str) -> Result<Url> {
        validate_source_url(candidate, &self.allowed_host)
    }
}

/// Accept only http(s) URLs whose host is exactly `allowed_host`
pub fn validate_source_url(candidate: &str, allowed_host: &str) -> Result<Url> {
    let invalid = || SourceError::InvalidUrl(candidate.to_string());
    let parsed = Url::parse(candidate).map_err(|_| invalid())?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }

    match parsed.host_str() {
        Some(host) if host.eq_ignore_ascii_case(allowed_host) => Ok(parsed),
        _ => Err(invalid()),
    }
}
