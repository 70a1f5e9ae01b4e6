//! Error types for the new-tab service

use image_cache_db::StoreError;
use std::fmt;
use unsplash_source::SourceError;

#[derive(Debug)]
pub enum NewTabError {
    /// URL failed the image-source allowlist check; nothing was fetched
    InvalidSourceUrl(String),
    FetchFailed(SourceError),
    StoreUnavailable(StoreError),
    Preferences(String),
    Config(String),
    /// A spawned new-tab task panicked or was cancelled
    Task(String),
}

impl fmt::Display for NewTabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewTabError::InvalidSourceUrl(url) => write!(f, "Invalid source URL: {}", url),
            NewTabError::FetchFailed(err) => write!(f, "Fetch failed: {}", err),
            NewTabError::StoreUnavailable(err) => write!(f, "Store unavailable: {}", err),
            NewTabError::Preferences(msg) => write!(f, "Preferences error: {}", msg),
            NewTabError::Config(msg) => write!(f, "Configuration error: {}", msg),
            NewTabError::Task(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl std::error::Error for NewTabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NewTabError::FetchFailed(err) => Some(err),
            NewTabError::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for NewTabError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidUrl(url) => NewTabError::InvalidSourceUrl(url),
            other => NewTabError::FetchFailed(other),
        }
    }
}

impl From<StoreError> for NewTabError {
    fn from(err: StoreError) -> Self {
        NewTabError::StoreUnavailable(err)
    }
}

impl From<tokio::task::JoinError> for NewTabError {
    fn from(err: tokio::task::JoinError) -> Self {
        NewTabError::Task(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for NewTabError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        NewTabError::Config(err.to_string())
    }
}

impl From<std::io::Error> for NewTabError {
    fn from(err: std::io::Error) -> Self {
        NewTabError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NewTabError>;
