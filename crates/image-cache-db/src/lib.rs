//! Image cache store
//!
//! A single versioned SQLite table of cached background images. Records are
//! only ever inserted or deleted; callers derive chronology from
//! `created_at`.

pub mod error;
pub mod images;
pub mod migrate;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::ImageStore;
pub use types::*;
