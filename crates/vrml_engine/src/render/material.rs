//! Active material state carried through traversal

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec3;
use crate::scene::node::Material;

/// The single material in effect for a draw
///
/// A Material node may list several values per channel; the first one becomes
/// active here, and the full diffuse list stays available for per-face and
/// per-vertex bindings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    /// Diffuse color
    pub diffuse: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Emissive color
    pub emissive: Vec3,
    /// Shininess in `[0, 1]`
    pub shininess: f32,
    /// Transparency in `[0, 1]`
    pub transparency: f32,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            specular: Vec3::zeros(),
            emissive: Vec3::zeros(),
            shininess: 0.2,
            transparency: 0.0,
        }
    }
}

impl MaterialState {
    /// Overwrite the channels `material` actually specifies
    pub fn apply(&mut self, material: &Material) {
        if let Some(diffuse) = material.diffuse.first() {
            self.diffuse = *diffuse;
        }
        if let Some(ambient) = material.ambient.first() {
            self.ambient = *ambient;
        }
        if let Some(specular) = material.specular.first() {
            self.specular = *specular;
        }
        if let Some(emissive) = material.emissive.first() {
            self.emissive = *emissive;
        }
        if let Some(shininess) = material.shininess.first() {
            self.shininess = *shininess;
        }
        if let Some(transparency) = material.transparency.first() {
            self.transparency = *transparency;
        }
    }

    /// Diffuse color with alpha derived from transparency
    pub fn diffuse_rgba(&self) -> [f32; 4] {
        [self.diffuse.x, self.diffuse.y, self.diffuse.z, 1.0 - self.transparency]
    }

    /// GPU layout of this material
    pub fn to_gpu(&self) -> GpuMaterial {
        let rgba = |c: Vec3| [c.x, c.y, c.z, 1.0];
        GpuMaterial {
            diffuse: self.diffuse_rgba(),
            ambient: rgba(self.ambient),
            specular: rgba(self.specular),
            emissive: rgba(self.emissive),
            shininess: self.shininess,
            transparency: self.transparency,
            _padding: [0.0; 2],
        }
    }
}

/// Material block as laid out in the uniform buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    /// Diffuse RGBA
    pub diffuse: [f32; 4],
    /// Ambient RGBA
    pub ambient: [f32; 4],
    /// Specular RGBA
    pub specular: [f32; 4],
    /// Emissive RGBA
    pub emissive: [f32; 4],
    /// Shininess
    pub shininess: f32,
    /// Transparency
    pub transparency: f32,
    /// Keeps the block a multiple of 16 bytes
    pub _padding: [f32; 2],
}
