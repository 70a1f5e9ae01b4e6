//! Image fetching

use crate::error::{Result, SourceError};
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str = "unsplash-new-tab/0.1";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Anything that can turn an image URL into an embeddable data URI
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<String>;
}

/// HTTP client that downloads images and encodes them as data URIs.
///
/// Performs no URL validation and no retries; both belong to the caller.
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Create a new fetcher with default settings
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self::with_client(client)
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch one image and return it as a `data:` URI
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching image");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Failed to fetch image");
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let data = response.bytes().await?;
        if data.is_empty() {
            warn!(url = %url, "Image source returned an empty body");
            return Err(SourceError::EmptyBody(url.to_string()));
        }

        debug!(
            size = data.len(),
            content_type = %content_type,
            "Fetched image"
        );

        Ok(encode_data_uri(&content_type, &data))
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for ImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<String> {
        self.fetch(url).await
    }
}

/// Encode binary image data as a self-contained `data:` URI
pub fn encode_data_uri(content_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        BASE64_STANDARD.encode(data)
    )
}
