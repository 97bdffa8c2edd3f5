//! # Viewer Configuration
//!
//! Configuration structures for the scene browser. Every structure has defaults
//! that reproduce the stock viewer, and all of them can be loaded from TOML or
//! RON through the [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Camera Config**: projection parameters and the fallback eye position
//! - **Tessellation Config**: segment count for curved primitives
//! - **Input Config**: drag and scroll sensitivities

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Camera Configuration
///
/// Projection parameters used until a scene viewpoint overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Eye position used when the scene defines no viewpoint
    pub start_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            start_position: [0.0, 0.0, 5.0],
        }
    }
}

/// # Tessellation Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Slices and stacks used for spheres, cones and cylinders
    pub segments: u32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self { segments: 20 }
    }
}

/// # Input Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Radians of yaw/pitch per pixel of drag
    pub drag_sensitivity: f32,
    /// World units of dolly per scroll unit
    pub scroll_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.01,
            scroll_sensitivity: 0.1,
        }
    }
}

/// # Viewer Configuration
///
/// Top-level configuration handed to [`crate::browser::SceneBrowser`].
///
/// ```rust,no_run
/// use vrml_engine::core::config::{Config, ViewerConfig};
///
/// let config = ViewerConfig::load_from_file("viewer.toml").unwrap_or_default();
/// assert!(config.point_size > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Camera parameters
    pub camera: CameraConfig,
    /// Curved-surface tessellation
    pub tessellation: TessellationConfig,
    /// Point size for PointSet draws
    pub point_size: f32,
    /// Synthesize a headlight when the scene has no lights
    pub headlight: bool,
    /// Mouse interaction
    pub input: InputConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            tessellation: TessellationConfig::default(),
            point_size: 10.0,
            headlight: true,
            input: InputConfig::default(),
        }
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_stock_viewer() {
        let config = ViewerConfig::default();
        assert_relative_eq!(config.camera.fov_degrees, 60.0);
        assert_relative_eq!(config.camera.near, 0.1);
        assert_relative_eq!(config.camera.far, 100.0);
        assert_eq!(config.tessellation.segments, 20);
        assert_relative_eq!(config.point_size, 10.0);
        assert!(config.headlight);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
point_size = 4.0

[tessellation]
segments = 32
"#;
        let config = ViewerConfig::from_str_with_format(text, "viewer.toml").unwrap();
        assert_eq!(config.tessellation.segments, 32);
        assert_relative_eq!(config.point_size, 4.0);
        assert_relative_eq!(config.camera.far, 100.0);
    }

    #[test]
    fn test_ron_round_trip_through_text() {
        let text = "(headlight: false, camera: (fov_degrees: 45.0))";
        let config = ViewerConfig::from_str_with_format(text, "viewer.ron").unwrap();
        assert!(!config.headlight);
        assert_relative_eq!(config.camera.fov_degrees, 45.0);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = ViewerConfig::from_str_with_format("", "viewer.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
