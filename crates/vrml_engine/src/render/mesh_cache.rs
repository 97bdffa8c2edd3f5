//! Meshes cached by node identity
//!
//! A shape is tessellated the first time traversal reaches it and reused on
//! every later frame. The cache lives as long as one loaded scene.

use std::collections::HashMap;
use std::sync::Arc;

use crate::scene::NodeId;
use super::mesh::Mesh;

/// Node-keyed mesh storage
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: HashMap<NodeId, Arc<Mesh>>,
    misses: usize,
}

impl MeshCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached mesh for `node`, building it with `build` on a miss.
    ///
    /// A `None` from `build` is not cached, so shapes that produce nothing are
    /// retried when their state changes.
    pub fn get_or_build(&mut self, node: NodeId, build: impl FnOnce() -> Option<Mesh>) -> Option<Arc<Mesh>> {
        if let Some(mesh) = self.meshes.get(&node) {
            return Some(Arc::clone(mesh));
        }
        self.misses += 1;
        let mesh = Arc::new(build()?);
        log::trace!("Tessellated node {:?}: {} vertices", node, mesh.vertex_count());
        self.meshes.insert(node, Arc::clone(&mesh));
        Some(mesh)
    }

    /// Cached mesh for `node`, if any
    pub fn get(&self, node: NodeId) -> Option<&Arc<Mesh>> {
        self.meshes.get(&node)
    }

    /// Number of cached meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Number of times a mesh had to be built
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drop every mesh
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.misses = 0;
    }
}
