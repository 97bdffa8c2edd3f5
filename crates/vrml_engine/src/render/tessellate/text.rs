//! AsciiText placement
//!
//! Text is drawn as one textured quad in the XY plane. The host rasterizes
//! the lines; this module only sizes and aligns the quad.

use crate::foundation::math::{Vec2, Vec3};
use crate::render::mesh::{Mesh, Topology, Vertex};
use crate::scene::node::{FontStyle, Justification};
use super::WHITE;

/// Quad for a text block of `line_count` lines whose bitmap has width/height `aspect`.
///
/// The block's height is `size * line_count * spacing`. The first line's top
/// sits at `y = size` so the baseline of the first line is near the origin.
pub fn text_quad(style: &FontStyle, justification: Justification, spacing: f32, line_count: usize, aspect: f32) -> Option<Mesh> {
    if line_count == 0 || aspect <= 0.0 {
        return None;
    }
    let height = style.size * line_count as f32 * spacing.max(f32::EPSILON);
    let width = height * aspect;
    let (left, right) = match justification {
        Justification::Left => (0.0, width),
        Justification::Center => (-width * 0.5, width * 0.5),
        Justification::Right => (-width, 0.0),
    };
    let (top, bottom) = (style.size, style.size - height);

    let corner = |x: f32, y: f32, u: f32, v: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::z(), WHITE, Vec2::new(u, v));
    let top_left = corner(left, top, 0.0, 0.0);
    let bottom_left = corner(left, bottom, 0.0, 1.0);
    let bottom_right = corner(right, bottom, 1.0, 1.0);
    let top_right = corner(right, top, 1.0, 0.0);

    Some(Mesh::new(
        vec![bottom_left, bottom_right, top_right, bottom_left, top_right, top_left],
        Topology::Triangles,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quad_size_follows_font_and_lines() {
        let style = FontStyle { size: 2.0, ..FontStyle::DEFAULT };
        let mesh = text_quad(&style, Justification::Left, 1.0, 3, 0.5).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min, Vec3::new(0.0, -4.0, 0.0));
        assert_relative_eq!(max, Vec3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_justification_shifts_quad() {
        let style = FontStyle { size: 1.0, ..FontStyle::DEFAULT };
        let (min, max) = text_quad(&style, Justification::Center, 1.0, 1, 4.0).unwrap().bounds().unwrap();
        assert_relative_eq!(min.x, -2.0);
        assert_relative_eq!(max.x, 2.0);

        let (min, max) = text_quad(&style, Justification::Right, 1.0, 1, 4.0).unwrap().bounds().unwrap();
        assert_relative_eq!(min.x, -4.0);
        assert_relative_eq!(max.x, 0.0);
    }

    #[test]
    fn test_empty_text_has_no_quad() {
        assert!(text_quad(&FontStyle::DEFAULT, Justification::Left, 1.0, 0, 1.0).is_none());
    }
}
