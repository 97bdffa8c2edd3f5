//! # VRML Engine
//!
//! An interpreter for VRML 1.0 scene documents.
//!
//! ## Features
//!
//! - **Tolerant parsing**: unknown nodes and fields never abort a load
//! - **Stateful traversal**: Separator scoping, sibling-order transforms, LOD and Switch
//! - **Tessellation**: primitives and indexed face, line and point sets, cached per node
//! - **Picking**: ray casts against cubes and spheres with anchor inheritance
//! - **Background inlines**: WWWInline documents fetched off the render thread
//!
//! The crate never opens a window or talks to a GPU. Hosts supply a document
//! fetcher, a texture loader and a text rasterizer, and draw the
//! [`render::DrawCommand`]s each frame produces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vrml_engine::prelude::*;
//!
//! struct NoTextures;
//! impl TextureLoader for NoTextures {
//!     fn load_texture(&mut self, location: &Location) -> Result<TextureHandle, AssetError> {
//!         Err(AssetError::Unsupported(location.to_string()))
//!     }
//! }
//!
//! struct NoText;
//! impl TextRasterizer for NoText {
//!     fn rasterize(&mut self, _request: &TextRequest<'_>) -> Option<TextBitmap> {
//!         None
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut browser = SceneBrowser::new(
//!         ViewerConfig::default(),
//!         Arc::new(FileFetcher),
//!         Box::new(NoTextures),
//!         Box::new(NoText),
//!     );
//!     browser.load_location(Location::path("scene.wrl"))?;
//!     let frame = browser.frame(Vec2::new(800.0, 600.0));
//!     println!("{} draws", frame.draws.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod foundation;
pub mod config;

// Interpreter
pub mod assets;
pub mod scene;
pub mod render;
pub mod physics;
pub mod input;
pub mod events;

mod browser;

pub use browser::SceneBrowser;

/// Common imports for hosts
pub mod prelude {
    pub use crate::{
        SceneBrowser,
        assets::{
            AssetError, DocumentFetcher, FileFetcher, Location, TextBitmap, TextRasterizer, TextRequest,
            TextureHandle, TextureLoader,
        },
        config::Config,
        core::config::ViewerConfig,
        events::{Event, EventType},
        foundation::math::{Vec2, Vec3, Mat4},
        input::{AnchorLink, PickHit},
        render::{Camera, DrawCommand, FrameOutput, Mesh, Topology},
        scene::{NodeId, NodeKind, SceneGraph},
    };
}
