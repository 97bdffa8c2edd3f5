//! # Rendering
//!
//! Everything between the scene graph and a GPU backend. The interpreter does
//! not talk to a graphics API. Each frame it produces [`DrawCommand`]s holding
//! cached meshes and packed uniform blocks, plus the frame's light list, and a
//! backend uploads and draws them.
//!
//! ## Architecture
//!
//! - **Traversal**: walks the graph and accumulates inherited state
//! - **Tessellation**: pure shape-to-mesh functions
//! - **Mesh cache**: meshes keyed by node identity
//! - **Camera**: viewer camera and projection math shared with picking
//! - **Lighting / Material / Uniforms**: GPU-ready data layouts

pub mod camera;
pub mod mesh;
pub mod mesh_cache;
pub mod lighting;
pub mod material;
pub mod uniforms;
pub mod tessellate;
pub mod traversal;

pub use camera::{Camera, Projection};
pub use mesh::{Mesh, Topology, Vertex};
pub use mesh_cache::MeshCache;
pub use lighting::{GpuLight, Light, LightType};
pub use material::{GpuMaterial, MaterialState};
pub use uniforms::{DrawParams, Uniforms};
pub use tessellate::{tessellate, ShapeContext};
pub use traversal::{
    collect_lights, collect_viewpoints, walk_placed,
    BoundTexture, DrawCommand, FrameOutput, HostServices, SceneRenderer, TraversalState, Viewpoint,
};
