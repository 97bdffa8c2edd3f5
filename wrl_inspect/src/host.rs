//! Host collaborators for headless inspection
//!
//! Textures are decoded with the `image` crate so broken references show up
//! in the log. Text is never rasterized, only measured.

use vrml_engine::prelude::*;

/// Decoded image kept on the CPU
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Decode the image at `path`
    pub fn from_file(path: &std::path::Path) -> Result<Self, AssetError> {
        log::debug!("Loading image from: {:?}", path);

        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                AssetError::NotFound(path.display().to_string())
            }
            image::ImageError::Unsupported(_) => AssetError::Unsupported(path.display().to_string()),
            other => AssetError::Decode(format!("{}: {}", path.display(), other)),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded image {}x{} from {:?}", width, height, path);

        Ok(Self { data: rgba.into_raw(), width, height })
    }
}

/// Texture loader that decodes local image files and hands out sequential handles
#[derive(Default)]
pub struct ImageTextures {
    next: u64,
}

impl TextureLoader for ImageTextures {
    fn load_texture(&mut self, location: &Location) -> Result<TextureHandle, AssetError> {
        let path = match location {
            Location::Path(path) => path.clone(),
            Location::Url(url) => match url.strip_prefix("file://") {
                Some(path) => path.into(),
                None => return Err(AssetError::Unsupported(url.clone())),
            },
        };
        let image = ImageData::from_file(&path)?;
        self.next += 1;
        log::debug!(
            "Texture {} is {}x{} ({} bytes)",
            self.next,
            image.width,
            image.height,
            image.data.len()
        );
        Ok(TextureHandle(self.next))
    }
}

/// Average glyph width over glyph height for a monospace estimate
const GLYPH_ASPECT: f32 = 0.6;

/// Text "rasterizer" that only estimates the bitmap shape
#[derive(Default)]
pub struct EstimatedText {
    requests: usize,
}

impl TextRasterizer for EstimatedText {
    fn rasterize(&mut self, request: &TextRequest<'_>) -> Option<TextBitmap> {
        let columns = request.lines.iter().map(|line| line.chars().count()).max()?;
        if columns == 0 {
            return None;
        }
        self.requests += 1;
        let aspect = columns as f32 * GLYPH_ASPECT / request.lines.len() as f32;
        Some(TextBitmap { texture: TextureHandle(u64::MAX - self.requests as u64), aspect })
    }
}
