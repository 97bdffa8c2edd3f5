//! Host-provided collaborators
//!
//! Fetching documents, decoding images and rasterizing text are host
//! concerns. The interpreter talks to them through these traits and only ever
//! sees opaque [`TextureHandle`]s.

use super::{AssetError, Location};
use crate::scene::node::{FontStyle, Justification};

/// Opaque handle to a texture owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Fetches document text. Called from the inline loader's worker threads.
pub trait DocumentFetcher: Send + Sync {
    /// Return the full text of the document at `location`
    fn fetch(&self, location: &Location) -> Result<String, AssetError>;
}

/// Turns an image reference into a host texture
pub trait TextureLoader {
    /// Load the image at `location`
    fn load_texture(&mut self, location: &Location) -> Result<TextureHandle, AssetError>;
}

/// What to rasterize for an AsciiText node
#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    /// One entry per line
    pub lines: &'a [String],
    /// Font in effect
    pub style: FontStyle,
    /// Line alignment
    pub justification: Justification,
    /// Line spacing multiplier
    pub spacing: f32,
}

/// A rasterized text block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBitmap {
    /// Texture holding the glyphs
    pub texture: TextureHandle,
    /// Width divided by height of the bitmap
    pub aspect: f32,
}

/// Renders text lines to a texture
pub trait TextRasterizer {
    /// Rasterize `request`, or `None` if it cannot be drawn
    fn rasterize(&mut self, request: &TextRequest<'_>) -> Option<TextBitmap>;
}

/// Fetches documents from the local file system.
///
/// `file://` URLs are mapped to paths. Other schemes are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl DocumentFetcher for FileFetcher {
    fn fetch(&self, location: &Location) -> Result<String, AssetError> {
        let path = match location {
            Location::Path(path) => path.clone(),
            Location::Url(url) => match url.strip_prefix("file://") {
                Some(path) => path.into(),
                None => return Err(AssetError::Unsupported(url.clone())),
            },
        };
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::Io(e),
        })
    }
}
