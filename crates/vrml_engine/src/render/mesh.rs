//! Mesh representation for tessellated shapes
//!
//! Tessellation produces [`Mesh`]es in a single interleaved vertex layout that a
//! GPU backend can upload as-is through [`Mesh::vertex_bytes`].

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Vec2, Vec3};

/// Interleaved vertex data
///
/// `#[repr(C)]` with only `f32` arrays, so the layout has no padding and the
/// struct can be cast to bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in object space
    pub position: [f32; 3],
    /// Unit normal
    pub normal: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Build a vertex from math types
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4], tex_coord: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            color,
            tex_coord: tex_coord.into(),
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Normal as a vector
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Every three vertices form a triangle
    Triangles,
    /// Every two vertices form a segment
    Lines,
    /// Every vertex is a point
    Points,
}

/// Tessellated geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Optional index buffer into `vertices`
    pub indices: Option<Vec<u32>>,
    /// How vertices are assembled
    pub topology: Topology,
}

impl Mesh {
    /// Non-indexed mesh
    pub fn new(vertices: Vec<Vertex>, topology: Topology) -> Self {
        Self { vertices, indices: None, topology }
    }

    /// Indexed mesh
    pub fn indexed(vertices: Vec<Vertex>, indices: Vec<u32>, topology: Topology) -> Self {
        Self { vertices, indices: Some(indices), topology }
    }

    /// Vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of vertices the draw call consumes
    pub fn element_count(&self) -> usize {
        self.indices.as_ref().map_or(self.vertices.len(), Vec::len)
    }

    /// Raw vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Object-space bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(Vertex::position);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 12 * 4);
    }

    #[test]
    fn test_counts_and_bounds() {
        let white = [1.0; 4];
        let vertices = vec![
            Vertex::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::z(), white, Vec2::zeros()),
            Vertex::new(Vec3::new(3.0, -2.0, 0.0), Vec3::z(), white, Vec2::zeros()),
        ];
        let mesh = Mesh::indexed(vertices, vec![0, 1], Topology::Lines);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.element_count(), 2);
        assert_eq!(mesh.vertex_bytes().len(), 2 * 48);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(3.0, 0.0, 2.0));
    }
}
