//! Schema versions declared by documents.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Version of the document schema a file was written against.
///
/// Ordering is lexicographic over `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Failure to read a `schemaVersion` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema version '{input}': {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: String,
}

impl SchemaVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version leniently.
    ///
    /// Accepts `"2.0.0"`, `"2.0"`, `"2"` and a leading `v`. Missing components
    /// default to zero; pre-release and build metadata are rejected.
    pub fn parse_lenient(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let error = |reason: &str| VersionParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(error("version is empty"));
        }

        let components = trimmed.split('.').count();
        let normalized = match components {
            1 => format!("{trimmed}.0.0"),
            2 => format!("{trimmed}.0"),
            3 => trimmed.to_string(),
            _ => return Err(error("expected at most three components")),
        };

        let parsed = semver::Version::parse(&normalized).map_err(|e| error(&e.to_string()))?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(error("pre-release and build metadata are not supported"));
        }

        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Interpret a numeric `schemaVersion` such as `1`, `0` or `1.1`.
    pub fn from_number(value: f64) -> Result<Self, VersionParseError> {
        if !value.is_finite() || value < 0.0 {
            return Err(VersionParseError {
                input: value.to_string(),
                reason: "version must be a non-negative number".to_string(),
            });
        }
        Self::parse_lenient(&value.to_string())
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
