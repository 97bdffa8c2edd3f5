//! Lighting for traversal output
//!
//! Lights are gathered in world space before anything is drawn, so a light
//! affects geometry anywhere in the scene regardless of where it appears in
//! document order. When a scene contributes no light a single headlight is
//! synthesized.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::scene::node::{LightKind, LightNode};

/// Types of lights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light (like sun)
    Directional = 0,
    /// Point light (like bulb)
    Point = 1,
    /// Spot light (like flashlight)
    Spot = 2,
}

/// A light resolved to world space
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Type of light
    pub light_type: LightType,
    /// World position; unused for directional lights
    pub position: Vec3,
    /// World direction (normalized); unused for point lights
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Spot falloff exponent
    pub drop_off_rate: f32,
    /// Spot cone half-angle in radians
    pub cut_off_angle: f32,
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction: direction.try_normalize(f32::EPSILON).unwrap_or(-Vec3::z()),
            color,
            intensity,
            drop_off_rate: 0.0,
            cut_off_angle: 0.0,
        }
    }

    /// White headlight shining along `forward`
    pub fn headlight(forward: Vec3) -> Self {
        Self::directional(forward, Vec3::new(1.0, 1.0, 1.0), 1.0)
    }

    /// Resolve a light node under `transform`.
    ///
    /// Positions transform as points and directions as vectors. Lights that
    /// are switched off yield `None`.
    pub fn from_node(node: &LightNode, transform: &Mat4) -> Option<Self> {
        if !node.on {
            return None;
        }
        let point = |p: Vec3| transform.transform_point(&Point3::from(p)).coords;
        let direction = |d: Vec3| {
            transform
                .transform_vector(&d)
                .try_normalize(f32::EPSILON)
                .unwrap_or(-Vec3::z())
        };

        let light = match node.kind {
            LightKind::Directional { direction: d } => Self {
                direction: direction(d),
                ..Self::directional(d, node.color, node.intensity)
            },
            LightKind::Point { location } => Self {
                light_type: LightType::Point,
                position: point(location),
                direction: Vec3::zeros(),
                color: node.color,
                intensity: node.intensity,
                drop_off_rate: 0.0,
                cut_off_angle: 0.0,
            },
            LightKind::Spot { location, direction: d, drop_off_rate, cut_off_angle } => Self {
                light_type: LightType::Spot,
                position: point(location),
                direction: direction(d),
                color: node.color,
                intensity: node.intensity,
                drop_off_rate,
                cut_off_angle,
            },
        };
        Some(light)
    }

    /// Uniform-buffer layout
    pub fn to_gpu(&self) -> GpuLight {
        GpuLight {
            position: [self.position.x, self.position.y, self.position.z, 1.0],
            direction: [self.direction.x, self.direction.y, self.direction.z, 0.0],
            color: [self.color.x, self.color.y, self.color.z, 1.0],
            intensity: self.intensity,
            light_type: self.light_type as i32,
            drop_off_rate: self.drop_off_rate,
            cut_off_angle: self.cut_off_angle,
        }
    }
}

/// Light as laid out in the light buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// World position, `w = 1`
    pub position: [f32; 4],
    /// World direction, `w = 0`
    pub direction: [f32; 4],
    /// RGB color, `a = 1`
    pub color: [f32; 4],
    /// Intensity
    pub intensity: f32,
    /// `LightType` discriminant
    pub light_type: i32,
    /// Spot falloff exponent
    pub drop_off_rate: f32,
    /// Spot cone half-angle
    pub cut_off_angle: f32,
}
