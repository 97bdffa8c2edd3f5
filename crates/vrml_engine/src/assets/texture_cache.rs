//! Texture cache keyed by the filename written in the document
//!
//! Each filename is loaded at most once. A failed load is remembered so the
//! traversal does not retry it every frame.

use std::collections::HashMap;

use super::{Location, TextureHandle, TextureLoader};

/// Texture cache
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, Option<TextureHandle>>,
}

impl TextureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the texture for `filename`, loading it on first use.
    ///
    /// # Arguments
    /// * `filename` - Reference exactly as written in the Texture2 node
    /// * `base` - Location relative references resolve against
    /// * `loader` - Host texture loader
    ///
    /// # Returns
    /// The handle, or `None` when the reference is empty or failed to load
    pub fn load_or_get(
        &mut self,
        filename: &str,
        base: Option<&Location>,
        loader: &mut dyn TextureLoader,
    ) -> Option<TextureHandle> {
        if filename.is_empty() {
            return None;
        }
        if let Some(entry) = self.entries.get(filename) {
            return *entry;
        }

        let handle = match Location::resolve(base, filename) {
            Ok(location) => match loader.load_texture(&location) {
                Ok(handle) => {
                    log::debug!("Loaded texture {} as {:?}", location, handle);
                    Some(handle)
                }
                Err(e) => {
                    log::warn!("Failed to load texture {}: {}", location, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Bad texture reference '{}': {}", filename, e);
                None
            }
        };
        self.entries.insert(filename.to_string(), handle);
        handle
    }

    /// Number of filenames seen, failures included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no texture was requested yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
