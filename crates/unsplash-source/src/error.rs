//! Error types for the Unsplash Source client

use std::fmt;

#[derive(Debug)]
pub enum SourceError {
    Http(Box<reqwest::Error>),
    Status { status: u16, url: String },
    EmptyBody(String),
    InvalidUrl(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Http(err) => write!(f, "HTTP error: {}", err),
            SourceError::Status { status, url } => {
                write!(f, "Image source returned status {} for {}", status, url)
            }
            SourceError::EmptyBody(url) => write!(f, "Empty image body from {}", url),
            SourceError::InvalidUrl(msg) => write!(f, "Invalid source URL: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
