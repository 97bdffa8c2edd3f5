//! Built-in primitives: cube, sphere, cone and cylinder
//!
//! All primitives are centered on the origin with Y up and wound
//! counter-clockwise when seen from outside. Meshes are non-indexed triangle
//! lists.

use crate::foundation::math::{constants, Vec2, Vec3};
use crate::render::mesh::{Mesh, Topology, Vertex};
use crate::scene::node::{Cone, ConeParts, Cube, Cylinder, CylinderParts, Sphere};

const MIN_SEGMENTS: u32 = 3;

/// Unit-cube faces: outward normal and four corners in counter-clockwise order
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
    ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
    ([1.0, 0.0, 0.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]]),
    ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
    ([0.0, 1.0, 0.0], [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
    ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
];

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// 36-vertex box with per-face normals
pub fn cube(cube: &Cube, color: [f32; 4]) -> Mesh {
    let half = cube.half_extents();
    let mut vertices = Vec::with_capacity(36);
    for (normal, corners) in &CUBE_FACES {
        let normal = Vec3::from(*normal);
        let corner = |i: usize| {
            Vertex::new(
                Vec3::from(corners[i]).component_mul(&half),
                normal,
                color,
                Vec2::from(QUAD_UVS[i]),
            )
        };
        vertices.extend([corner(0), corner(1), corner(2), corner(0), corner(2), corner(3)]);
    }
    Mesh::new(vertices, Topology::Triangles)
}

/// Latitude/longitude sphere with smooth normals, unrolled to a triangle list
pub fn sphere(sphere: &Sphere, color: [f32; 4], segments: u32) -> Mesh {
    let stacks = segments.max(MIN_SEGMENTS);
    let slices = segments.max(MIN_SEGMENTS);
    let point = |i: u32, j: u32| {
        let theta = i as f32 / stacks as f32 * constants::PI;
        let phi = j as f32 / slices as f32 * constants::TAU;
        let normal = Vec3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
        let uv = Vec2::new(j as f32 / slices as f32, i as f32 / stacks as f32);
        Vertex::new(normal * sphere.radius, normal, color, uv)
    };

    let mut vertices = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = point(i, j);
            let b = point(i + 1, j);
            let c = point(i + 1, j + 1);
            let d = point(i, j + 1);
            vertices.extend([a, b, c, a, c, d]);
        }
    }
    Mesh::new(vertices, Topology::Triangles)
}

/// Cylinder with optional side, top and bottom
pub fn cylinder(cylinder: &Cylinder, color: [f32; 4], segments: u32) -> Option<Mesh> {
    let slices = segments.max(MIN_SEGMENTS);
    let half_height = cylinder.height * 0.5;
    let radius = cylinder.radius;
    let mut vertices = Vec::new();

    for j in 0..slices {
        let (dir0, dir1) = (ring_direction(j, slices), ring_direction(j + 1, slices));
        let (u0, u1) = (j as f32 / slices as f32, (j + 1) as f32 / slices as f32);
        let at = |dir: Vec3, y: f32| dir * radius + Vec3::new(0.0, y, 0.0);

        if cylinder.parts.contains(CylinderParts::SIDES) {
            let b0 = Vertex::new(at(dir0, -half_height), dir0, color, Vec2::new(u0, 1.0));
            let b1 = Vertex::new(at(dir1, -half_height), dir1, color, Vec2::new(u1, 1.0));
            let t1 = Vertex::new(at(dir1, half_height), dir1, color, Vec2::new(u1, 0.0));
            let t0 = Vertex::new(at(dir0, half_height), dir0, color, Vec2::new(u0, 0.0));
            vertices.extend([b0, b1, t1, b0, t1, t0]);
        }
        if cylinder.parts.contains(CylinderParts::TOP) {
            let up = Vec3::y();
            let cap = |dir: Vec3| Vertex::new(at(dir, half_height), up, color, cap_uv(dir));
            let center = Vertex::new(Vec3::new(0.0, half_height, 0.0), up, color, Vec2::new(0.5, 0.5));
            vertices.extend([center, cap(dir0), cap(dir1)]);
        }
        if cylinder.parts.contains(CylinderParts::BOTTOM) {
            vertices.extend(bottom_cap_triangle(dir0, dir1, radius, -half_height, color));
        }
    }

    (!vertices.is_empty()).then(|| Mesh::new(vertices, Topology::Triangles))
}

/// Cone with optional slanted side and bottom
pub fn cone(cone: &Cone, color: [f32; 4], segments: u32) -> Option<Mesh> {
    let slices = segments.max(MIN_SEGMENTS);
    let half_height = cone.height * 0.5;
    let radius = cone.bottom_radius;
    let apex = Vec3::new(0.0, half_height, 0.0);
    let slope_normal = |dir: Vec3| {
        Vec3::new(dir.x * cone.height, radius, dir.z * cone.height)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y)
    };
    let mut vertices = Vec::new();

    for j in 0..slices {
        let (dir0, dir1) = (ring_direction(j, slices), ring_direction(j + 1, slices));
        if cone.parts.contains(ConeParts::SIDES) {
            let (u0, u1) = (j as f32 / slices as f32, (j + 1) as f32 / slices as f32);
            let mid = ring_direction_at((j as f32 + 0.5) / slices as f32);
            let base = |dir: Vec3, u: f32| {
                Vertex::new(dir * radius - Vec3::new(0.0, half_height, 0.0), slope_normal(dir), color, Vec2::new(u, 1.0))
            };
            let tip = Vertex::new(apex, slope_normal(mid), color, Vec2::new((u0 + u1) * 0.5, 0.0));
            vertices.extend([base(dir0, u0), base(dir1, u1), tip]);
        }
        if cone.parts.contains(ConeParts::BOTTOM) {
            vertices.extend(bottom_cap_triangle(dir0, dir1, radius, -half_height, color));
        }
    }

    (!vertices.is_empty()).then(|| Mesh::new(vertices, Topology::Triangles))
}

fn ring_direction(j: u32, slices: u32) -> Vec3 {
    ring_direction_at(j as f32 / slices as f32)
}

fn ring_direction_at(fraction: f32) -> Vec3 {
    let phi = fraction * constants::TAU;
    Vec3::new(phi.sin(), 0.0, phi.cos())
}

fn cap_uv(dir: Vec3) -> Vec2 {
    Vec2::new(0.5 + dir.x * 0.5, 0.5 - dir.z * 0.5)
}

/// Bottom-facing cap triangle; winding reversed relative to the top cap
fn bottom_cap_triangle(dir0: Vec3, dir1: Vec3, radius: f32, y: f32, color: [f32; 4]) -> [Vertex; 3] {
    let down = -Vec3::y();
    let cap = |dir: Vec3| Vertex::new(dir * radius + Vec3::new(0.0, y, 0.0), down, color, cap_uv(dir));
    let center = Vertex::new(Vec3::new(0.0, y, 0.0), down, color, Vec2::new(0.5, 0.5));
    [center, cap(dir1), cap(dir0)]
}
