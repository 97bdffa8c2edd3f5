//! Scene graph: node types, storage and child selection

pub mod node;
pub mod graph;
pub mod selection;

pub use graph::SceneGraph;
pub use node::{NodeKind, SceneNode};
pub use selection::{active_children, select_lod_child};

slotmap::new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}
