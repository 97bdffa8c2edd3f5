//! Tessellation of shape nodes into meshes
//!
//! Every function here is pure: the result depends only on the node's own
//! fields and the [`ShapeContext`] captured from the traversal state, which is
//! what lets the traversal cache meshes per node.

pub mod primitives;
pub mod indexed;
pub mod text;

use crate::foundation::math::{Vec2, Vec3};
use crate::scene::node::{Binding, ShapeHints};
use crate::scene::NodeKind;
use super::mesh::Mesh;

/// Color used when no material supplies one
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Traversal state a shape tessellates against
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    /// Current Coordinate3 points
    pub coordinates: &'a [Vec3],
    /// Current Normal vectors
    pub normals: &'a [Vec3],
    /// Current TextureCoordinate2 points
    pub tex_coords: &'a [Vec2],
    /// Diffuse colors of the current Material node
    pub palette: &'a [Vec3],
    /// Current material binding
    pub material_binding: Binding,
    /// Current normal binding
    pub normal_binding: Binding,
    /// Current shape hints
    pub shape_hints: ShapeHints,
    /// Active diffuse color, used by unlit lines and points
    pub diffuse: [f32; 4],
    /// Slices and stacks for curved primitives
    pub segments: u32,
}

impl<'a> ShapeContext<'a> {
    /// Context with no coordinates, materials or normals
    pub fn empty(segments: u32) -> Self {
        Self {
            coordinates: &[],
            normals: &[],
            tex_coords: &[],
            palette: &[],
            material_binding: Binding::Default,
            normal_binding: Binding::Default,
            shape_hints: ShapeHints::default(),
            diffuse: [0.8, 0.8, 0.8, 1.0],
            segments,
        }
    }

    /// First palette color, or white
    pub fn overall_color(&self) -> [f32; 4] {
        self.palette.first().map_or(WHITE, |c| rgba(*c))
    }

    /// Palette color at `index`
    pub fn palette_color(&self, index: usize) -> Option<[f32; 4]> {
        self.palette.get(index).map(|c| rgba(*c))
    }
}

pub(crate) fn rgba(color: Vec3) -> [f32; 4] {
    [color.x, color.y, color.z, 1.0]
}

/// Tessellate a geometry node other than AsciiText.
///
/// Returns `None` for non-geometry nodes and for shapes that produce nothing.
pub fn tessellate(kind: &NodeKind, ctx: &ShapeContext<'_>) -> Option<Mesh> {
    let color = ctx.overall_color();
    match kind {
        NodeKind::Cube(cube) => Some(primitives::cube(cube, color)),
        NodeKind::Sphere(sphere) => Some(primitives::sphere(sphere, color, ctx.segments)),
        NodeKind::Cone(cone) => primitives::cone(cone, color, ctx.segments),
        NodeKind::Cylinder(cylinder) => primitives::cylinder(cylinder, color, ctx.segments),
        NodeKind::IndexedFaceSet(shape) => indexed::face_set(shape, ctx),
        NodeKind::IndexedLineSet(shape) => indexed::line_set(shape, ctx),
        NodeKind::PointSet(points) => indexed::point_set(points, ctx),
        _ => None,
    }
}
