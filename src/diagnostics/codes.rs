//! Issue codes, grouped by the stage that reports them.

use std::fmt;

// ============================================================================
// PARSE
// ============================================================================

/// Malformed document syntax.
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
/// Key repeated inside one map; the last value wins.
pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";

// ============================================================================
// VERSION
// ============================================================================

pub const MISSING_SCHEMA_VERSION: &str = "MISSING_SCHEMA_VERSION";
pub const INVALID_SCHEMA_VERSION: &str = "INVALID_SCHEMA_VERSION";
/// Older than the minimum supported version.
pub const VERSION_TOO_OLD: &str = "VERSION_TOO_OLD";
/// Newer than the version this engine was built for.
pub const VERSION_TOO_NEW: &str = "VERSION_TOO_NEW";

// ============================================================================
// MIGRATION
// ============================================================================

pub const MIGRATION_APPLIED: &str = "MIGRATION_APPLIED";
/// Registered migrations do not reach the current version.
pub const MIGRATION_GAP: &str = "MIGRATION_GAP";
pub const KIND_INFERRED: &str = "KIND_INFERRED";

// ============================================================================
// SCHEMA
// ============================================================================

pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";
pub const INVALID_ENUM_VALUE: &str = "INVALID_ENUM_VALUE";
pub const PATTERN_MISMATCH: &str = "PATTERN_MISMATCH";
pub const UNKNOWN_FIELD: &str = "UNKNOWN_FIELD";
pub const INVALID_REFERENCE_SYNTAX: &str = "INVALID_REFERENCE_SYNTAX";
pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";

// ============================================================================
// REFERENCE
// ============================================================================

pub const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";
pub const CIRCULAR_REFERENCE: &str = "CIRCULAR_REFERENCE";
pub const DEPRECATED_REFERENCE: &str = "DEPRECATED_REFERENCE";
pub const CATEGORY_MISMATCH: &str = "CATEGORY_MISMATCH";

// ============================================================================
// SEMANTIC
// ============================================================================

pub const DUPLICATE_DEFINITION: &str = "DUPLICATE_DEFINITION";
pub const ORPHANED_VARIANT: &str = "ORPHANED_VARIANT";
pub const EMPTY_ENUM: &str = "EMPTY_ENUM";
pub const MISSING_COMPONENT: &str = "MISSING_COMPONENT";
pub const MISSING_PATTERN: &str = "MISSING_PATTERN";
pub const UNKNOWN_VARIANT_CONDITION: &str = "UNKNOWN_VARIANT_CONDITION";
pub const UNDECLARED_COMPONENT: &str = "UNDECLARED_COMPONENT";
pub const STRUCTURAL_CYCLE: &str = "STRUCTURAL_CYCLE";

/// Error taxonomy: which kind of failure an issue code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub enum IssueCategory {
    Parse,
    Version,
    Migration,
    Schema,
    Reference,
    Semantic,
}

impl IssueCategory {
    /// Category of a known code. Unknown codes are treated as schema issues.
    pub fn of(code: &str) -> Self {
        match code {
            SYNTAX_ERROR | DUPLICATE_KEY => Self::Parse,
            MISSING_SCHEMA_VERSION | INVALID_SCHEMA_VERSION | VERSION_TOO_OLD
            | VERSION_TOO_NEW => Self::Version,
            MIGRATION_APPLIED | MIGRATION_GAP | KIND_INFERRED => Self::Migration,
            UNRESOLVED_REFERENCE | CIRCULAR_REFERENCE | DEPRECATED_REFERENCE
            | CATEGORY_MISMATCH => Self::Reference,
            DUPLICATE_DEFINITION | ORPHANED_VARIANT | EMPTY_ENUM | MISSING_COMPONENT
            | MISSING_PATTERN | UNKNOWN_VARIANT_CONDITION | UNDECLARED_COMPONENT
            | STRUCTURAL_CYCLE => Self::Semantic,
            _ => Self::Schema,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Version => "version",
            Self::Migration => "migration",
            Self::Schema => "schema",
            Self::Reference => "reference",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SYNTAX_ERROR, IssueCategory::Parse)]
    #[case(VERSION_TOO_OLD, IssueCategory::Version)]
    #[case(MIGRATION_APPLIED, IssueCategory::Migration)]
    #[case(MIGRATION_GAP, IssueCategory::Migration)]
    #[case(TYPE_MISMATCH, IssueCategory::Schema)]
    #[case(CIRCULAR_REFERENCE, IssueCategory::Reference)]
    #[case(ORPHANED_VARIANT, IssueCategory::Semantic)]
    fn test_category_of(#[case] code: &str, #[case] expected: IssueCategory) {
        assert_eq!(IssueCategory::of(code), expected);
    }
}
