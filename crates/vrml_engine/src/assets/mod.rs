//! Asset management: document and texture collaborators
//!
//! The interpreter never performs I/O or image decoding itself. Hosts provide
//! a [`DocumentFetcher`], a [`TextureLoader`] and a [`TextRasterizer`]; this
//! module resolves references, caches results and runs inline fetches off the
//! render thread.

pub mod vrml;
pub mod location;
pub mod collaborators;
pub mod texture_cache;
pub mod loader;

pub use location::Location;
pub use collaborators::{
    DocumentFetcher, FileFetcher,
    TextureLoader, TextureHandle,
    TextRasterizer, TextRequest, TextBitmap,
};
pub use texture_cache::TextureCache;
pub use loader::{InlineLoader, InlineRequest, InlineResult};

use thiserror::Error;

/// Asset-related errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Reference could not be turned into a location
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Document parsed to nothing
    #[error("Document has no root node")]
    NoRootNode,

    /// Fetch failed for a reason reported by the fetcher
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Image or text could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Location scheme or format not supported by the collaborator
    #[error("Unsupported: {0}")]
    Unsupported(String),
}
