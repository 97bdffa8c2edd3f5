//! Rays and the shapes picking tests them against

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Ray for intersection tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing `direction`
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray through `matrix`, renormalizing the direction.
    ///
    /// Returns `None` when the mapped direction degenerates.
    pub fn transformed(&self, matrix: &Mat4) -> Option<Self> {
        let origin = matrix.transform_point(&Point3::from(self.origin)).coords;
        let direction = matrix.transform_vector(&self.direction).try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }
}

/// Sphere for ray tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Smallest positive ray parameter at which `ray` meets the surface
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// Axis-aligned box for ray tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box centered on the origin with the given half extents
    pub fn from_half_extents(half: Vec3) -> Self {
        Self { min: -half, max: half }
    }

    /// Slab test: smallest positive ray parameter inside the box.
    ///
    /// The box is closed. A ray parallel to a slab hits only when its origin
    /// lies within that slab, boundary planes included.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let (origin, direction) = (ray.origin[axis], ray.direction[axis]);
            let (min, max) = (self.min[axis], self.max[axis]);
            if direction == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }
            let t1 = (min - origin) / direction;
            let t2 = (max - origin) / direction;
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        if tmax < tmin || tmax <= 0.0 {
            return None;
        }
        Some(if tmin > 0.0 { tmin } else { tmax })
    }
}
