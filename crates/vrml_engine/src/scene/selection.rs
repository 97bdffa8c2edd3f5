//! Which children of a group a traversal visits
//!
//! Rendering, light collection, picking and viewpoint discovery all walk the
//! graph through [`active_children`] so a switched-off child is consistently
//! absent from every pass.

use crate::foundation::math::{Mat4, Point3};
use super::node::{InlineStatus, NodeKind, SWITCH_ALL};
use super::NodeId;

/// Pick the LOD child for a viewer at `distance` from the LOD center.
///
/// The chosen index is the first `i` whose threshold `range[i]` is greater than
/// the distance. A distance past every threshold selects `range.len()`, and the
/// result is clamped to the available children.
pub fn select_lod_child(range: &[f32], child_count: usize, distance: f32) -> Option<usize> {
    if child_count == 0 {
        return None;
    }
    let index = range
        .iter()
        .position(|threshold| distance < *threshold)
        .unwrap_or(range.len());
    Some(index.min(child_count - 1))
}

/// Children of `kind` that a traversal should visit.
///
/// `transform` is the accumulated transform at the group, used to place the
/// LOD center in world space relative to `viewer`.
pub fn active_children<'g>(kind: &'g NodeKind, transform: &Mat4, viewer: &Point3) -> &'g [NodeId] {
    match kind {
        NodeKind::Switch(switch) => {
            if switch.which_child == SWITCH_ALL {
                return &switch.children;
            }
            usize::try_from(switch.which_child)
                .ok()
                .and_then(|index| switch.children.get(index..=index))
                .unwrap_or(&[])
        }
        NodeKind::Lod(lod) => {
            let center = transform.transform_point(&Point3::from(lod.center));
            let distance = nalgebra::distance(&center, viewer);
            select_lod_child(&lod.range, lod.children.len(), distance)
                .and_then(|index| lod.children.get(index..=index))
                .unwrap_or(&[])
        }
        NodeKind::Inline(inline) if inline.status != InlineStatus::Loaded => &[],
        other => other.children(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::{Lod, Switch};
    use crate::scene::{SceneGraph, SceneNode};
    use crate::foundation::math::Vec3;

    fn leaves(count: usize) -> Vec<NodeId> {
        let mut graph = SceneGraph::new();
        (0..count)
            .map(|_| graph.insert(SceneNode::new(NodeKind::Info(String::new()))))
            .collect()
    }

    #[test]
    fn test_lod_threshold_is_exclusive() {
        let range = [10.0, 20.0];
        assert_eq!(select_lod_child(&range, 3, 5.0), Some(0));
        assert_eq!(select_lod_child(&range, 3, 10.0), Some(1));
        assert_eq!(select_lod_child(&range, 3, 25.0), Some(2));
    }

    #[test]
    fn test_lod_index_clamps_to_children() {
        assert_eq!(select_lod_child(&[10.0, 20.0], 2, 25.0), Some(1));
        assert_eq!(select_lod_child(&[], 2, 3.0), Some(0));
        assert_eq!(select_lod_child(&[1.0], 0, 3.0), None);
    }

    #[test]
    fn test_lod_uses_world_center() {
        let children = leaves(2);
        let lod = NodeKind::Lod(Lod { range: vec![10.0], center: Vec3::zeros(), children: children.clone() });
        let far_away = Mat4::new_translation(&Vec3::new(0.0, 0.0, -50.0));
        let viewer = Point3::origin();
        assert_eq!(active_children(&lod, &Mat4::identity(), &viewer), &children[0..1]);
        assert_eq!(active_children(&lod, &far_away, &viewer), &children[1..2]);
    }

    #[test]
    fn test_switch_selection() {
        let children = leaves(3);
        let switch = |which_child| NodeKind::Switch(Switch { which_child, children: children.clone() });
        let eye = Point3::origin();
        let id = Mat4::identity();
        assert!(active_children(&switch(-1), &id, &eye).is_empty());
        assert_eq!(active_children(&switch(1), &id, &eye), &children[1..2]);
        assert_eq!(active_children(&switch(-3), &id, &eye).len(), 3);
        assert!(active_children(&switch(7), &id, &eye).is_empty());
    }
}
