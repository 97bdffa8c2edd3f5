//! Document and image locations

use std::fmt;
use std::path::{Path, PathBuf};

use super::AssetError;

/// Where a document or image lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Local file system path
    Path(PathBuf),
    /// Absolute URL with a scheme
    Url(String),
}

impl Location {
    /// Location from a file system path
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Classify a reference as a URL (it has a scheme) or a path
    pub fn parse(reference: &str) -> Self {
        if has_scheme(reference) {
            Self::Url(reference.to_string())
        } else {
            Self::Path(PathBuf::from(reference))
        }
    }

    /// Resolve `reference` against an optional base location.
    ///
    /// References with a scheme are used as-is. Relative paths join onto the
    /// directory of a path base; relative URLs replace the last segment of a
    /// URL base, and a leading `/` replaces the whole path.
    pub fn resolve(base: Option<&Location>, reference: &str) -> Result<Self, AssetError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AssetError::InvalidLocation("empty reference".into()));
        }
        if has_scheme(reference) {
            return Ok(Self::Url(reference.to_string()));
        }

        match base {
            None => Ok(Self::parse(reference)),
            Some(Self::Path(base)) => {
                let relative = Path::new(reference);
                if relative.is_absolute() {
                    return Ok(Self::Path(relative.to_path_buf()));
                }
                let dir = base.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::Path(dir.join(relative)))
            }
            Some(Self::Url(base)) => {
                let scheme_end = base
                    .find("://")
                    .map(|i| i + 3)
                    .ok_or_else(|| AssetError::InvalidLocation(base.clone()))?;
                let authority_end = base[scheme_end..]
                    .find('/')
                    .map_or(base.len(), |i| scheme_end + i);

                if reference.starts_with('/') {
                    return Ok(Self::Url(format!("{}{}", &base[..authority_end], reference)));
                }
                let dir_end = base[authority_end..]
                    .rfind('/')
                    .map_or(authority_end, |i| authority_end + i);
                Ok(Self::Url(format!("{}/{}", &base[..dir_end], reference)))
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn has_scheme(reference: &str) -> bool {
    match reference.find("://") {
        Some(end) if end > 0 => reference[..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_joins_base_directory() {
        let base = Location::path("worlds/city/main.wrl");
        let resolved = Location::resolve(Some(&base), "house.wrl").unwrap();
        assert_eq!(resolved, Location::path("worlds/city/house.wrl"));
    }

    #[test]
    fn test_absolute_reference_ignores_base() {
        let base = Location::path("worlds/main.wrl");
        let resolved = Location::resolve(Some(&base), "http://example.com/a.wrl").unwrap();
        assert_eq!(resolved, Location::Url("http://example.com/a.wrl".into()));
    }

    #[test]
    fn test_relative_url_replaces_last_segment() {
        let base = Location::Url("http://example.com/worlds/main.wrl".into());
        let resolved = Location::resolve(Some(&base), "tex/brick.png").unwrap();
        assert_eq!(resolved, Location::Url("http://example.com/worlds/tex/brick.png".into()));
    }

    #[test]
    fn test_rooted_reference_replaces_url_path() {
        let base = Location::Url("http://example.com/worlds/main.wrl".into());
        let resolved = Location::resolve(Some(&base), "/other.wrl").unwrap();
        assert_eq!(resolved, Location::Url("http://example.com/other.wrl".into()));
    }

    #[test]
    fn test_url_base_without_path() {
        let base = Location::Url("http://example.com".into());
        let resolved = Location::resolve(Some(&base), "a.wrl").unwrap();
        assert_eq!(resolved, Location::Url("http://example.com/a.wrl".into()));
    }

    #[test]
    fn test_empty_reference_is_invalid() {
        assert!(matches!(Location::resolve(None, "  "), Err(AssetError::InvalidLocation(_))));
    }
}
