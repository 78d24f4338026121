//! Domain constants shared across the pipeline.

use super::version::SchemaVersion;

/// Oldest schema version that can still be migrated.
pub const MIN_SUPPORTED_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Schema version the validator understands natively.
pub const CURRENT_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(2, 0, 0);

/// Leading character of a token reference (`$color.primitive.blue.600`).
pub const REFERENCE_SIGIL: char = '$';

/// Separator between reference path segments.
pub const PATH_SEPARATOR: char = '.';

/// Deepest array/object nesting the JSON parser accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Longest alias chain followed before giving up on a reference.
pub const MAX_REFERENCE_DEPTH: usize = 64;

/// Field holding the document schema version.
pub const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Field holding the document kind.
pub const KIND_FIELD: &str = "kind";

pub const JSON_EXT: &str = "json";
pub const JSONC_EXT: &str = "jsonc";
pub const YAML_EXT: &str = "yaml";
pub const YML_EXT: &str = "yml";

/// File extensions the project loader picks up.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[JSON_EXT, JSONC_EXT, YAML_EXT, YML_EXT];
