//! Dependency coordinates
//!
//! Two shapes are accepted:
//!
//! - `artifact:version`, e.g. `lib:1.0`
//! - `group:artifact:version`, e.g. `org.example:lib:1.0`
//!
//! # Examples
//!
//! ```
//! use script_config::dependency::DependencyCoordinate;
//!
//! let coordinate = DependencyCoordinate::parse("org.example:lib:1.2").unwrap();
//! assert_eq!(coordinate.group.as_deref(), Some("org.example"));
//! assert_eq!(coordinate.artifact, "lib");
//! assert_eq!(coordinate.to_string(), "org.example:lib:1.2");
//! ```

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A parsed dependency coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyCoordinate {
    pub group: Option<String>,
    pub artifact: String,
    pub version: String,
}

impl DependencyCoordinate {
    /// Parse a coordinate string
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| Error::InvalidCoordinate {
            coordinate: raw.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (group, artifact, version) = match parts.as_slice() {
            [artifact, version] => (None, *artifact, *version),
            [group, artifact, version] => (Some(*group), *artifact, *version),
            _ => {
                return Err(invalid(
                    "expected 'artifact:version' or 'group:artifact:version'",
                ));
            }
        };

        for part in group.iter().chain([&artifact, &version]) {
            if part.is_empty() {
                return Err(invalid("empty component"));
            }
            if !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
            {
                return Err(invalid("unsupported character"));
            }
        }

        Ok(Self {
            group: group.map(str::to_string),
            artifact: artifact.to_string(),
            version: version.to_string(),
        })
    }

    /// Identity of the module regardless of version
    pub fn module(&self) -> (Option<&str>, &str) {
        (self.group.as_deref(), &self.artifact)
    }

    /// Compare versions of two coordinates
    ///
    /// Versions are read as semver, with `major.minor` padded to
    /// `major.minor.0`. Versions that are not semver compare as strings.
    pub fn compare_version(&self, other: &DependencyCoordinate) -> Ordering {
        match (
            normalize_version(&self.version),
            normalize_version(&other.version),
        ) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.version.cmp(&other.version),
        }
    }
}

impl std::fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}:{}:{}", group, self.artifact, self.version),
            None => write!(f, "{}:{}", self.artifact, self.version),
        }
    }
}

fn normalize_version(s: &str) -> Option<semver::Version> {
    if let Ok(v) = semver::Version::parse(s) {
        return Some(v);
    }
    semver::Version::parse(&format!("{s}.0")).ok()
}
