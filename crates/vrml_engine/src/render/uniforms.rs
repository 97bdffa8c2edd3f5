//! Per-draw uniform block

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{mat4_to_cols, Mat3, Mat4};
use super::material::{GpuMaterial, MaterialState};

/// Uniform block handed to the GPU backend for each draw
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    /// Projection matrix
    pub projection: [[f32; 4]; 4],
    /// View times model
    pub model_view: [[f32; 4]; 4],
    /// Inverse transpose of the model-view upper 3x3, columns padded to vec4
    pub normal_matrix: [[f32; 4]; 3],
    /// Texture coordinate transform
    pub texture_transform: [[f32; 4]; 4],
    /// Active material
    pub material: GpuMaterial,
    /// Number of lights in the frame's light buffer
    pub light_count: i32,
    /// Non-zero when a texture is bound
    pub has_texture: i32,
    /// Rasterized point size
    pub point_size: f32,
    /// Non-zero to skip lighting
    pub is_unlit: i32,
}

/// Inputs for building a [`Uniforms`] block
#[derive(Debug, Clone, Copy)]
pub struct DrawParams<'a> {
    /// Projection matrix
    pub projection: &'a Mat4,
    /// View matrix
    pub view: &'a Mat4,
    /// Model matrix
    pub model: &'a Mat4,
    /// Texture transform
    pub texture_transform: &'a Mat4,
    /// Active material
    pub material: &'a MaterialState,
    /// Lights in the frame
    pub light_count: usize,
    /// Whether a texture is bound
    pub has_texture: bool,
    /// Point size
    pub point_size: f32,
    /// Skip lighting
    pub unlit: bool,
}

impl Uniforms {
    /// Build the block for one draw
    pub fn new(params: &DrawParams<'_>) -> Self {
        let model_view = params.view * params.model;
        Self {
            projection: mat4_to_cols(params.projection),
            model_view: mat4_to_cols(&model_view),
            normal_matrix: normal_matrix(&model_view),
            texture_transform: mat4_to_cols(params.texture_transform),
            material: params.material.to_gpu(),
            light_count: i32::try_from(params.light_count).unwrap_or(i32::MAX),
            has_texture: i32::from(params.has_texture),
            point_size: params.point_size,
            is_unlit: i32::from(params.unlit),
        }
    }
}

fn normal_matrix(model_view: &Mat4) -> [[f32; 4]; 3] {
    let upper: Mat3 = model_view.fixed_view::<3, 3>(0, 0).into_owned();
    let normal = upper.try_inverse().map_or(upper, |inverse| inverse.transpose());
    let column = |i: usize| [normal[(0, i)], normal[(1, i)], normal[(2, i)], 0.0];
    [column(0), column(1), column(2)]
}
