//! Module version handling.
//!
//! Versions follow a strict `MAJOR.MINOR.PATCH` scheme so that any two
//! module versions are totally ordered. The ordering falls out of the field
//! order of [`ModuleVersion`] together with the derived `Ord`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error raised when a version string does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("expected MAJOR.MINOR.PATCH, found {found} component(s)")]
    WrongComponentCount { found: usize },

    #[error("component '{component}' is not a number")]
    InvalidComponent { component: String },
}

/// A totally ordered `MAJOR.MINOR.PATCH` module version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    /// Major version - breaking changes
    pub major: u32,
    /// Minor version - backwards-compatible additions
    pub minor: u32,
    /// Patch version - bug fixes
    pub patch: u32,
}

impl ModuleVersion {
    /// Construct a version from parts.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check if this version satisfies a required version.
    ///
    /// Major version must match, minor must be >= required.
    pub fn is_compatible_with(&self, required: &Self) -> bool {
        self.major == required.major && self.minor >= required.minor
    }
}

impl std::fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for ModuleVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::WrongComponentCount { found: parts.len() });
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| VersionParseError::InvalidComponent {
                    component: (*part).to_string(),
                })?;
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl Serialize for ModuleVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModuleVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let version: ModuleVersion = "1.2.3".parse().unwrap();
        assert_eq!(version, ModuleVersion::new(1, 2, 3));
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_wrong_component_count() {
        let err = "1.2".parse::<ModuleVersion>().unwrap_err();
        assert_eq!(err, VersionParseError::WrongComponentCount { found: 2 });
        assert!("1.2.3.4".parse::<ModuleVersion>().is_err());
    }

    #[test]
    fn test_non_numeric_component() {
        let err = "1.2.x".parse::<ModuleVersion>().unwrap_err();
        assert_eq!(
            err,
            VersionParseError::InvalidComponent {
                component: "x".to_string()
            }
        );
    }

    #[test]
    fn test_total_ordering() {
        let a: ModuleVersion = "1.2.3".parse().unwrap();
        let b: ModuleVersion = "1.10.0".parse().unwrap();
        let c: ModuleVersion = "2.0.0".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_compatibility() {
        let host: ModuleVersion = "1.4.0".parse().unwrap();
        assert!(host.is_compatible_with(&"1.2.0".parse().unwrap()));
        assert!(!host.is_compatible_with(&"1.5.0".parse().unwrap()));
        assert!(!host.is_compatible_with(&"2.0.0".parse().unwrap()));
    }
}
