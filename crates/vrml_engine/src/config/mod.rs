//! Configuration files for the viewer
//!
//! Settings are plain serde structs stored as TOML or RON; the format follows
//! the file extension. Every field is optional in the file and missing ones
//! keep their defaults, so a `viewer.toml` only needs the overrides:
//!
//! ```toml
//! point_size = 4.0          # pixels per PointSet point
//! headlight = false         # no synthesized light for unlit scenes
//!
//! [camera]
//! fov_degrees = 45.0
//! near = 0.1
//! far = 500.0
//! start_position = [0.0, 1.5, 8.0]
//!
//! [tessellation]
//! segments = 32             # slices and stacks of curved primitives
//!
//! [input]
//! drag_sensitivity = 0.005  # radians per pixel
//! scroll_sensitivity = 0.25 # world units per wheel step
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

pub use serde::{Serialize, Deserialize};

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from the extension of `path`, ignoring case
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            Self::Ron => ron::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, String> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Ron => "RON",
        })
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_str_with_format(&contents, path)?;
        log::info!("Loaded {} configuration from {}", format, path.display());
        Ok(config)
    }

    /// Parse configuration text, picking the format from `path`'s extension
    fn from_str_with_format(contents: &str, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        format
            .parse(contents)
            .map_err(|message| ConfigError::Parse { path: path.to_path_buf(), format, message })
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = format.render(self).map_err(|message| ConfigError::Serialize { format, message })?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File contents are not valid for the format
    #[error("{format} parse error in {}: {message}", path.display())]
    Parse {
        /// Configuration file
        path: PathBuf,
        /// Format the file was read as
        format: ConfigFormat,
        /// Parser message
        message: String,
    },

    /// Settings could not be written in the format
    #[error("{format} serialization error: {message}")]
    Serialize {
        /// Target format
        format: ConfigFormat,
        /// Serializer message
        message: String,
    },

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported config format: {} (expected .toml or .ron)", .0.display())]
    UnsupportedFormat(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ViewerConfig;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vrml_engine_{}_{}", std::process::id(), name))
    }

    fn customized() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.headlight = false;
        config.point_size = 3.0;
        config.tessellation.segments = 8;
        config.camera.start_position = [1.0, 2.0, 3.0];
        config.input.scroll_sensitivity = 0.5;
        config
    }

    #[test]
    fn test_toml_file_round_trip() {
        let path = temp_path("viewer.toml");
        customized().save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, customized());
    }

    #[test]
    fn test_ron_file_round_trip() {
        let path = temp_path("viewer.ron");
        customized().save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, customized());
    }

    #[test]
    fn test_format_follows_extension_case_insensitively() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/VIEWER.TOML")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("viewer.ron")).unwrap(), ConfigFormat::Ron);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("viewer")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = temp_path("absent.toml");
        match ViewerConfig::load_from_file(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml_reports_format() {
        let result = ViewerConfig::from_str_with_format("point_size = [", "viewer.toml");
        assert!(matches!(result, Err(ConfigError::Parse { format: ConfigFormat::Toml, .. })));
    }

    #[test]
    fn test_unsupported_extension_is_not_written() {
        let path = temp_path("viewer.json");
        let result = ViewerConfig::default().save_to_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
        assert!(!path.exists());
    }
}
