//! Unsplash Source client
//!
//! Builds image-source URLs from user preferences, validates that a URL
//! belongs to the image source, and fetches images as self-contained
//! `data:` URIs that can be stored and rendered without network access.

pub mod error;
pub mod fetcher;
pub mod types;
pub mod urls;

pub use error::{Result, SourceError};
pub use fetcher::{encode_data_uri, ImageFetcher, ImageSource};
pub use types::{Preferences, Resolution, SelectedContent};
pub use urls::{SourceUrls, DEFAULT_BASE_URL};
