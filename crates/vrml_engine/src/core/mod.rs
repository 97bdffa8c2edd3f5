//! Core viewer types shared across subsystems

pub mod config;

pub use config::{ViewerConfig, CameraConfig, TessellationConfig, InputConfig};
