//! Picking: screen points to scene hits
//!
//! [`MouseState`] tracks the pointer so a host can tell a click (pick) from a
//! drag (camera rotation). [`pick`] casts the ray and walks the graph with the
//! same transform accumulation and child selection as rendering.

use crate::foundation::math::{Mat4, Point3, Vec2, Vec3};
use crate::physics::{Aabb, BoundingSphere, Ray};
use crate::render::Camera;
use crate::scene::node::{Anchor, AnchorMap};
use crate::scene::{active_children, NodeId, NodeKind, SceneGraph};

/// Pointer movement below this many pixels is still a click
const DRAG_THRESHOLD: f32 = 5.0;

/// Mouse state for picking operations
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    /// Current position in pixels from the top-left
    pub position: Vec2,
    /// Position at the last drag update
    last_position: Vec2,
    /// Where the button went down, while held
    pub drag_start: Option<Vec2>,
}

impl MouseState {
    /// Update the pointer position
    pub fn update_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Button pressed at the current position
    pub fn start_drag(&mut self) {
        self.drag_start = Some(self.position);
        self.last_position = self.position;
    }

    /// Button released. Returns true when the press counts as a click
    pub fn end_drag(&mut self) -> bool {
        let click = self.drag_start.is_some() && !self.is_dragging();
        self.drag_start = None;
        click
    }

    /// Whether the held button has moved far enough to be a drag
    pub fn is_dragging(&self) -> bool {
        self.drag_start
            .is_some_and(|start| (self.position - start).norm() >= DRAG_THRESHOLD)
    }

    /// Movement since the previous call while dragging, zero otherwise
    pub fn take_drag_delta(&mut self) -> Vec2 {
        if self.drag_start.is_none() {
            return Vec2::zeros();
        }
        let delta = self.position - self.last_position;
        self.last_position = self.position;
        delta
    }
}

/// Hyperlink inherited by a picked shape
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLink {
    /// Anchor node
    pub node: NodeId,
    /// Target URL as written
    pub url: String,
    /// Human-readable description
    pub description: String,
    /// Hit point in the anchor's coordinate system, when the anchor maps points
    pub point: Option<Vec3>,
}

impl AnchorLink {
    /// URL to open; with point mapping the hit point is appended as a query
    pub fn target(&self) -> String {
        match self.point {
            Some(p) => format!("{}?{},{},{}", self.url, p.x, p.y, p.z),
            None => self.url.clone(),
        }
    }
}

/// Closest intersection along a pick ray
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    /// Shape that was hit
    pub node: NodeId,
    /// Distance from the ray origin in world units
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Innermost enclosing anchor
    pub anchor: Option<AnchorLink>,
}

/// Pick through a pixel of the viewport
pub fn pick(graph: &SceneGraph, camera: &Camera, screen: Vec2, viewport: Vec2) -> Option<PickHit> {
    let ray = camera.screen_to_world_ray(screen, viewport)?;
    pick_ray(graph, &ray, &Point3::from(camera.position))
}

/// Closest Cube or Sphere hit along a world-space ray.
///
/// `viewer` selects LOD children the same way rendering does.
pub fn pick_ray(graph: &SceneGraph, ray: &Ray, viewer: &Point3) -> Option<PickHit> {
    let root = graph.root()?;
    let mut picker = Picker { graph, ray, viewer, best: None };
    picker.visit(root, &mut Mat4::identity(), None);
    if let Some(hit) = &picker.best {
        log::debug!("Picked node {:?} at distance {:.3}", hit.node, hit.distance);
    }
    picker.best
}

struct Picker<'g, 'r> {
    graph: &'g SceneGraph,
    ray: &'r Ray,
    viewer: &'r Point3,
    best: Option<PickHit>,
}

impl<'g> Picker<'g, '_> {
    fn visit(&mut self, id: NodeId, transform: &mut Mat4, anchor: Option<(NodeId, &'g Anchor, Mat4)>) {
        let graph = self.graph;
        let Some(kind) = graph.kind(id) else {
            return;
        };
        match kind {
            NodeKind::Transform(t) => *transform *= t.to_matrix(),
            NodeKind::MatrixTransform(m) => *transform *= m,
            NodeKind::Cube(cube) => {
                let bounds = Aabb::from_half_extents(cube.half_extents());
                self.test(id, transform, anchor, |ray| bounds.intersect_ray(ray));
            }
            NodeKind::Sphere(sphere) => {
                let bounds = BoundingSphere::new(Vec3::zeros(), sphere.radius);
                self.test(id, transform, anchor, |ray| bounds.intersect_ray(ray));
            }
            kind if kind.is_group() => {
                let anchor = match kind {
                    NodeKind::Anchor(link) => Some((id, link, *transform)),
                    _ => anchor,
                };
                let mut inner = *transform;
                for child in active_children(kind, transform, self.viewer) {
                    self.visit(*child, &mut inner, anchor);
                }
            }
            _ => {}
        }
    }

    fn test(
        &mut self,
        node: NodeId,
        transform: &Mat4,
        anchor: Option<(NodeId, &Anchor, Mat4)>,
        intersect: impl Fn(&Ray) -> Option<f32>,
    ) {
        let Some(local_ray) = transform.try_inverse().and_then(|inverse| self.ray.transformed(&inverse)) else {
            log::trace!("Skipping node {:?} with singular transform", node);
            return;
        };
        let Some(t) = intersect(&local_ray) else {
            return;
        };
        let point = transform.transform_point(&Point3::from(local_ray.point_at(t))).coords;
        let distance = (point - self.ray.origin).dot(&self.ray.direction);
        if distance <= 0.0 || self.best.as_ref().is_some_and(|best| best.distance <= distance) {
            return;
        }

        let anchor = anchor.map(|(anchor_node, link, anchor_transform)| AnchorLink {
            node: anchor_node,
            url: link.url.clone(),
            description: link.description.clone(),
            point: match link.map {
                AnchorMap::Point => anchor_transform
                    .try_inverse()
                    .map(|inverse| inverse.transform_point(&Point3::from(point)).coords),
                AnchorMap::None => None,
            },
        });
        self.best = Some(PickHit { node, distance, point, anchor });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::assets::vrml::parse;

    fn cast(source: &str, origin: Vec3, direction: Vec3) -> Option<PickHit> {
        let graph = parse(source).unwrap();
        pick_ray(&graph, &Ray::new(origin, direction), &Point3::origin())
    }

    #[test]
    fn test_unit_sphere_distance_is_near_root() {
        let origin = Vec3::new(0.3, 0.2, 5.0);
        let direction = Vec3::new(0.0, 0.0, -1.0);
        let hit = cast("Separator { Sphere {} }", origin, direction).unwrap();

        let (a, b, c) = (direction.dot(&direction), 2.0 * origin.dot(&direction), origin.dot(&origin) - 1.0);
        let expected = (-b - (b * b - 4.0 * a * c).sqrt()) / (2.0 * a);
        assert_relative_eq!(hit.distance, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_closest_hit_wins_across_transforms() {
        let hit = cast(
            "Separator {
                DEF Far Cube {}
                Translation { translation 0 0 2 }
                DEF Near Sphere { radius 0.5 }
            }",
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 7.5, epsilon = 1e-4);
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, 2.5), epsilon = 1e-4);
    }

    #[test]
    fn test_scaled_shape_reports_world_distance() {
        let hit = cast(
            "Separator { Scale { scaleFactor 2 2 2 } Cube {} }",
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn test_innermost_anchor_is_reported() {
        let hit = cast(
            "WWWAnchor {
                name \"outer.wrl\"
                Separator {
                    WWWAnchor { name \"inner.wrl\" description \"Inner\" map POINT Cube {} }
                }
            }",
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
        )
        .unwrap();
        let anchor = hit.anchor.unwrap();
        assert_eq!(anchor.url, "inner.wrl");
        assert_eq!(anchor.description, "Inner");
        assert_relative_eq!(anchor.point.unwrap(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        assert!(anchor.target().starts_with("inner.wrl?"));
    }

    #[test]
    fn test_switched_off_children_and_misses() {
        assert!(cast("Switch { Cube {} }", Vec3::new(0.0, 0.0, 10.0), -Vec3::z()).is_none());
        assert!(cast("Separator { Cube {} }", Vec3::new(5.0, 0.0, 10.0), -Vec3::z()).is_none());
        assert!(cast("Separator { Cube {} }", Vec3::new(0.0, 0.0, 10.0), Vec3::z()).is_none());
        // Only cubes and spheres are pickable
        assert!(cast("Separator { Cone {} }", Vec3::new(0.0, 0.0, 10.0), -Vec3::z()).is_none());
    }

    #[test]
    fn test_click_versus_drag() {
        let mut mouse = MouseState::default();
        mouse.update_position(Vec2::new(100.0, 100.0));
        mouse.start_drag();
        mouse.update_position(Vec2::new(102.0, 101.0));
        assert!(mouse.end_drag());

        mouse.start_drag();
        mouse.update_position(Vec2::new(130.0, 101.0));
        assert!(mouse.is_dragging());
        assert_relative_eq!(mouse.take_drag_delta(), Vec2::new(28.0, 0.0));
        assert_relative_eq!(mouse.take_drag_delta(), Vec2::zeros());
        assert!(!mouse.end_drag());
    }
}
