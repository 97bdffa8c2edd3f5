//! Arena-backed scene graph
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]. The
//! graph is built by the parser, read by traversal and picking, and mutated
//! only by inline publication on the render thread.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::assets::Location;
use super::node::{InlineStatus, NodeKind, SceneNode};
use super::NodeId;

/// A parsed scene
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: Option<NodeId>,
    base: Option<Location>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Empty graph with no root
    pub fn new() -> Self {
        Self { nodes: SlotMap::with_key(), root: None, base: None }
    }

    /// Insert a node and return its handle
    pub fn insert(&mut self, node: SceneNode) -> NodeId {
        self.nodes.insert(node)
    }

    /// Root node, if the document produced one
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Location relative references in this document resolve against
    pub fn base(&self) -> Option<&Location> {
        self.base.as_ref()
    }

    /// Set the document location
    pub fn set_base(&mut self, base: Option<Location>) {
        self.base = base;
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Look up a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Node payload shortcut
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|node| &node.kind)
    }

    /// Children of a node, empty when it is not a group or does not exist
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.kind(id).map_or(&[], NodeKind::children)
    }

    /// Number of nodes stored, aliases counted once
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every stored node
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter()
    }

    /// Find the first node carrying a `DEF` name
    pub fn find_named(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// Set the status of an inline node. Returns false if `id` is not an inline.
    pub fn set_inline_status(&mut self, id: NodeId, status: InlineStatus) -> bool {
        match self.nodes.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Inline(inline)) => {
                inline.status = status;
                true
            }
            _ => false,
        }
    }

    /// Move every node of `loaded` into this graph and publish them as the
    /// children of the inline `id`.
    ///
    /// A loaded root that is a group contributes its children; any other root
    /// becomes the single child. The children, status and location are set in
    /// one step so traversal never sees a partially published inline.
    pub fn splice_inline(&mut self, id: NodeId, loaded: SceneGraph, location: Location) -> bool {
        if !matches!(self.kind(id), Some(NodeKind::Inline(_))) {
            return false;
        }

        let loaded_root = loaded.root;
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(loaded.nodes.len());
        for (old_id, node) in loaded.nodes {
            remap.insert(old_id, self.nodes.insert(node));
        }

        for new_id in remap.values() {
            if let Some(children) = self.nodes.get_mut(*new_id).and_then(|n| n.kind.children_mut()) {
                for child in children.iter_mut() {
                    if let Some(mapped) = remap.get(child) {
                        *child = *mapped;
                    }
                }
            }
        }

        let children = match loaded_root.and_then(|root| remap.get(&root).copied()) {
            Some(root) => match self.nodes.get(root).map(|n| &n.kind) {
                Some(kind) if kind.is_group() => {
                    let children = kind.children().to_vec();
                    self.nodes.remove(root);
                    children
                }
                _ => vec![root],
            },
            None => Vec::new(),
        };

        if let Some(NodeKind::Inline(inline)) = self.nodes.get_mut(id).map(|n| &mut n.kind) {
            inline.children = children;
            inline.location = Some(location);
            inline.status = InlineStatus::Loaded;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::{Group, GroupKind, Inline, Sphere};

    fn graph_with_inline() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let inline = graph.insert(SceneNode::new(NodeKind::Inline(Inline::default())));
        let mut root = Group::new(GroupKind::Separator);
        root.children.push(inline);
        let root = graph.insert(SceneNode::new(NodeKind::Group(root)));
        graph.set_root(root);
        (graph, inline)
    }

    fn loaded_separator_with_sphere() -> SceneGraph {
        let mut loaded = SceneGraph::new();
        let sphere = loaded.insert(SceneNode::new(NodeKind::Sphere(Sphere::default())));
        let mut group = Group::new(GroupKind::Separator);
        group.children.push(sphere);
        let root = loaded.insert(SceneNode::new(NodeKind::Group(group)));
        loaded.set_root(root);
        loaded
    }

    #[test]
    fn test_splice_group_root_publishes_its_children() {
        let (mut graph, inline) = graph_with_inline();
        assert!(graph.splice_inline(inline, loaded_separator_with_sphere(), Location::path("a.wrl")));

        let children = graph.children(inline).to_vec();
        assert_eq!(children.len(), 1);
        assert!(matches!(graph.kind(children[0]), Some(NodeKind::Sphere(_))));
        match graph.kind(inline) {
            Some(NodeKind::Inline(inline)) => assert_eq!(inline.status, InlineStatus::Loaded),
            other => panic!("expected inline, got {other:?}"),
        }
        // inline, outer root, sphere
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_splice_single_node_root() {
        let (mut graph, inline) = graph_with_inline();
        let mut loaded = SceneGraph::new();
        let sphere = loaded.insert(SceneNode::new(NodeKind::Sphere(Sphere::default())));
        loaded.set_root(sphere);

        graph.splice_inline(inline, loaded, Location::path("b.wrl"));
        assert_eq!(graph.children(inline).len(), 1);
    }

    #[test]
    fn test_splice_rejects_non_inline() {
        let (mut graph, _) = graph_with_inline();
        let root = graph.root().unwrap();
        assert!(!graph.splice_inline(root, SceneGraph::new(), Location::path("c.wrl")));
    }

    #[test]
    fn test_find_named() {
        let mut graph = SceneGraph::new();
        let mut node = SceneNode::new(NodeKind::Sphere(Sphere::default()));
        node.name = Some("Ball".into());
        let id = graph.insert(node);
        assert_eq!(graph.find_named("Ball"), Some(id));
        assert_eq!(graph.find_named("Cube"), None);
    }
}
