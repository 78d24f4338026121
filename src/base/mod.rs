//! Foundation types for the specforge toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`SourceLocation`], [`Position`] - Line/column locations for parsed nodes
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`SchemaVersion`] - Versions declared by documents
//! - Domain constants (version range, reference sigil, file extensions)
//!
//! This module has NO dependencies on other specforge modules.

pub mod constants;
mod position;
mod version;

pub use position::{LineIndex, Position, SourceLocation};
pub use version::{SchemaVersion, VersionParseError};

// Re-export text-size types for convenience
pub use text_size;
