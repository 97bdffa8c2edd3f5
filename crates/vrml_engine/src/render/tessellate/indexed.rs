//! IndexedFaceSet, IndexedLineSet and PointSet tessellation
//!
//! Faces are fan-triangulated from their first vertex. Corners are addressed
//! by their position `k` in `coordIndex` so per-vertex index arrays line up
//! with it, `-1` separators included.

use crate::foundation::math::{Vec2, Vec3};
use crate::render::mesh::{Mesh, Topology, Vertex};
use crate::scene::node::{Binding, IndexedShape, PointSet, VertexOrdering};
use super::ShapeContext;

/// One face or polyline: the positions in `coordIndex` it spans, plus its ordinal
struct Run {
    ordinal: usize,
    corners: Vec<usize>,
}

/// Split `coord_index` into runs separated by `-1`. A trailing run without a
/// terminator is kept.
fn runs(coord_index: &[i32]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut corners = Vec::new();
    for (k, index) in coord_index.iter().enumerate() {
        if *index < 0 {
            runs.push(Run { ordinal: runs.len(), corners: std::mem::take(&mut corners) });
        } else {
            corners.push(k);
        }
    }
    if !corners.is_empty() {
        runs.push(Run { ordinal: runs.len(), corners });
    }
    runs
}

fn as_index(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Index selected by a binding for the corner at position `k` of run `ordinal`
fn bound_index(binding: Binding, ordinal: usize, k: usize, coord: usize, indices: &[i32]) -> Option<usize> {
    match binding {
        Binding::Default => None,
        Binding::Overall => Some(0),
        Binding::PerPart | Binding::PerFace => Some(ordinal),
        Binding::PerPartIndexed | Binding::PerFaceIndexed => {
            if indices.is_empty() {
                Some(ordinal)
            } else {
                indices.get(ordinal).copied().and_then(as_index)
            }
        }
        Binding::PerVertex => Some(coord),
        Binding::PerVertexIndexed => {
            if indices.is_empty() {
                Some(coord)
            } else {
                indices.get(k).copied().and_then(as_index)
            }
        }
    }
}

fn corner_color(shape: &IndexedShape, ctx: &ShapeContext<'_>, ordinal: usize, k: usize, coord: usize) -> [f32; 4] {
    bound_index(ctx.material_binding, ordinal, k, coord, &shape.material_index)
        .and_then(|i| ctx.palette_color(i))
        .unwrap_or_else(|| ctx.overall_color())
}

/// Triangulate an IndexedFaceSet.
///
/// Faces with fewer than three corners or with out-of-range coordinates are
/// skipped but still count toward per-face binding. Without normals each
/// face gets its flat normal; texture V is flipped.
pub fn face_set(shape: &IndexedShape, ctx: &ShapeContext<'_>) -> Option<Mesh> {
    let clockwise = ctx.shape_hints.vertex_ordering == VertexOrdering::Clockwise;
    let mut vertices = Vec::new();

    for run in runs(&shape.coord_index) {
        if run.corners.len() < 3 {
            continue;
        }
        let coords: Option<Vec<usize>> = run
            .corners
            .iter()
            .map(|&k| as_index(shape.coord_index[k]).filter(|&c| c < ctx.coordinates.len()))
            .collect();
        let Some(coords) = coords else {
            log::debug!("Skipping face {} with out-of-range coordinate index", run.ordinal);
            continue;
        };

        let p = |i: usize| ctx.coordinates[coords[i]];
        let mut flat = (p(1) - p(0)).cross(&(p(2) - p(0))).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
        if clockwise {
            flat = -flat;
        }

        let corner = |i: usize| {
            let k = run.corners[i];
            let coord = coords[i];
            let normal = if ctx.normals.is_empty() {
                flat
            } else {
                bound_index(ctx.normal_binding, run.ordinal, k, coord, &shape.normal_index)
                    .and_then(|n| ctx.normals.get(n))
                    .and_then(|n| n.try_normalize(f32::EPSILON))
                    .unwrap_or(flat)
            };
            let tex_index = if shape.texture_coord_index.is_empty() {
                Some(coord)
            } else {
                shape.texture_coord_index.get(k).copied().and_then(as_index)
            };
            let uv = tex_index
                .and_then(|t| ctx.tex_coords.get(t))
                .map_or_else(Vec2::zeros, |t| Vec2::new(t.x, 1.0 - t.y));
            Vertex::new(ctx.coordinates[coord], normal, corner_color(shape, ctx, run.ordinal, k, coord), uv)
        };

        for t in 1..coords.len() - 1 {
            if clockwise {
                vertices.extend([corner(0), corner(t + 1), corner(t)]);
            } else {
                vertices.extend([corner(0), corner(t), corner(t + 1)]);
            }
        }
    }

    (!vertices.is_empty()).then(|| Mesh::new(vertices, Topology::Triangles))
}

/// Split each polyline of an IndexedLineSet into independent segments
pub fn line_set(shape: &IndexedShape, ctx: &ShapeContext<'_>) -> Option<Mesh> {
    let mut vertices = Vec::new();
    for run in runs(&shape.coord_index) {
        let corner = |k: usize| {
            let coord = as_index(shape.coord_index[k]).filter(|&c| c < ctx.coordinates.len())?;
            let color = match ctx.material_binding {
                Binding::Default | Binding::Overall => ctx.diffuse,
                binding => bound_index(binding, run.ordinal, k, coord, &shape.material_index)
                    .and_then(|i| ctx.palette_color(i))
                    .unwrap_or(ctx.diffuse),
            };
            Some(Vertex::new(ctx.coordinates[coord], Vec3::z(), color, Vec2::zeros()))
        };
        for pair in run.corners.windows(2) {
            if let (Some(a), Some(b)) = (corner(pair[0]), corner(pair[1])) {
                vertices.extend([a, b]);
            }
        }
    }

    if vertices.is_empty() {
        return None;
    }
    let indices = (0..vertices.len() as u32).collect();
    Some(Mesh::indexed(vertices, indices, Topology::Lines))
}

/// Emit the PointSet range `[start, start + count)`; a negative count runs to the end
pub fn point_set(points: &PointSet, ctx: &ShapeContext<'_>) -> Option<Mesh> {
    let start = as_index(points.start_index)?;
    let end = match as_index(points.num_points) {
        Some(count) => start.saturating_add(count).min(ctx.coordinates.len()),
        None => ctx.coordinates.len(),
    };
    if start >= end {
        return None;
    }

    let vertices = (start..end)
        .map(|i| {
            let color = match ctx.material_binding {
                Binding::PerVertex | Binding::PerVertexIndexed | Binding::PerPart | Binding::PerPartIndexed => {
                    ctx.palette_color(i - start).unwrap_or(ctx.diffuse)
                }
                _ => ctx.diffuse,
            };
            Vertex::new(ctx.coordinates[i], Vec3::z(), color, Vec2::zeros())
        })
        .collect();
    Some(Mesh::new(vertices, Topology::Points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::scene::node::ShapeHints;

    fn square() -> [Vec3; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    fn faces(coord_index: Vec<i32>) -> IndexedShape {
        IndexedShape { coord_index, ..Default::default() }
    }

    fn ctx(coordinates: &[Vec3]) -> ShapeContext<'_> {
        ShapeContext { coordinates, ..ShapeContext::empty(20) }
    }

    #[test]
    fn test_quad_fans_into_two_triangles_sharing_v0_and_v2() {
        let square = square();
        let mesh = face_set(&faces(vec![0, 1, 2, 3, -1]), &ctx(&square)).unwrap();
        let positions: Vec<Vec3> = mesh.vertices.iter().map(Vertex::position).collect();
        assert_eq!(positions, vec![square[0], square[1], square[2], square[0], square[2], square[3]]);
        for v in &mesh.vertices {
            assert_relative_eq!(v.normal(), Vec3::z());
        }
    }

    #[test]
    fn test_clockwise_hint_flips_winding_and_normal() {
        let square = square();
        let ctx = ShapeContext {
            shape_hints: ShapeHints { vertex_ordering: VertexOrdering::Clockwise, ..Default::default() },
            ..ctx(&square)
        };
        let mesh = face_set(&faces(vec![0, 1, 2, -1]), &ctx).unwrap();
        assert_eq!(mesh.vertices[1].position(), square[2]);
        assert_relative_eq!(mesh.vertices[0].normal(), -Vec3::z());
    }

    #[test]
    fn test_degenerate_and_invalid_faces_are_skipped() {
        let square = square();
        assert!(face_set(&faces(vec![0, 1, -1]), &ctx(&square)).is_none());
        assert!(face_set(&faces(vec![0, 1, 9, -1]), &ctx(&square)).is_none());
        let mesh = face_set(&faces(vec![0, 1, 9, -1, 0, 1, 2]), &ctx(&square)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_per_face_material_counts_skipped_faces() {
        let square = square();
        let palette = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let ctx = ShapeContext { palette: &palette, material_binding: Binding::PerFace, ..ctx(&square) };
        let mesh = face_set(&faces(vec![0, 1, -1, 0, 2, 3, -1]), &ctx).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.color == [0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_per_vertex_indexed_material() {
        let square = square();
        let palette = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let ctx = ShapeContext { palette: &palette, material_binding: Binding::PerVertexIndexed, ..ctx(&square) };
        let shape = IndexedShape { coord_index: vec![0, 1, 2, -1], material_index: vec![1, 0, 1, -1], ..Default::default() };
        let mesh = face_set(&shape, &ctx).unwrap();
        let colors: Vec<[f32; 4]> = mesh.vertices.iter().map(|v| v.color).collect();
        assert_eq!(colors, vec![[0.0, 1.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_overall_color_uses_first_palette_entry() {
        let square = square();
        let palette = [Vec3::new(0.5, 0.5, 0.0)];
        let ctx = ShapeContext { palette: &palette, ..ctx(&square) };
        let mesh = face_set(&faces(vec![0, 1, 2, -1]), &ctx).unwrap();
        assert_eq!(mesh.vertices[0].color, [0.5, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_per_vertex_normals_and_flipped_texture_v() {
        let square = square();
        let normals = [Vec3::new(0.0, 0.0, 2.0)];
        let tex = [Vec2::new(0.25, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)];
        let ctx = ShapeContext { normals: &normals, normal_binding: Binding::Overall, tex_coords: &tex, ..ctx(&square) };
        let mesh = face_set(&faces(vec![0, 1, 2, -1]), &ctx).unwrap();
        assert_relative_eq!(mesh.vertices[0].normal(), Vec3::z());
        assert_eq!(mesh.vertices[0].tex_coord, [0.25, 1.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn test_line_set_splits_polylines_into_segments() {
        let square = square();
        let mesh = line_set(&faces(vec![0, 1, 2, -1, 3, 0]), &ctx(&square)).unwrap();
        assert_eq!(mesh.topology, Topology::Lines);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices.as_deref(), Some(&[0, 1, 2, 3, 4, 5][..]));
        assert_eq!(mesh.vertices[4].position(), square[3]);
    }

    #[test]
    fn test_point_set_ranges() {
        let square = square();
        let all = point_set(&PointSet::default(), &ctx(&square)).unwrap();
        assert_eq!(all.vertex_count(), 4);
        assert_eq!(all.topology, Topology::Points);

        let middle = point_set(&PointSet { start_index: 1, num_points: 2 }, &ctx(&square)).unwrap();
        assert_eq!(middle.vertices[0].position(), square[1]);
        assert_eq!(middle.vertex_count(), 2);

        let clipped = point_set(&PointSet { start_index: 3, num_points: 10 }, &ctx(&square)).unwrap();
        assert_eq!(clipped.vertex_count(), 1);

        assert!(point_set(&PointSet { start_index: 4, num_points: -1 }, &ctx(&square)).is_none());
    }
}
