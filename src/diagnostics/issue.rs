use std::fmt;

use smol_str::SmolStr;

use super::codes::IssueCategory;
use crate::base::SourceLocation;

/// Severity level of an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation problem with its field path and location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Issue code (see [`super::codes`]).
    pub code: &'static str,
    pub category: IssueCategory,
    pub message: String,
    /// Field names from the document root to the offending value.
    pub path: Vec<SmolStr>,
    pub location: Option<SourceLocation>,
    pub suggestions: Vec<String>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            category: IssueCategory::of(code),
            message: message.into(),
            path: Vec::new(),
            location: None,
            suggestions: Vec::new(),
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a location only when one is known.
    pub fn with_location_opt(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// Dot-joined field path, e.g. `components.0.props.1.values`.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path_string())?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  help: {suggestion}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::codes;

    #[test]
    fn test_issue_builder() {
        let issue = ValidationIssue::error(codes::TYPE_MISMATCH, "expected string")
            .with_path(["components", "0", "name"])
            .with_location(SourceLocation::new("c.json", 2, 4))
            .with_suggestion("quote the value");

        assert!(issue.is_error());
        assert_eq!(issue.category, IssueCategory::Schema);
        assert_eq!(issue.path_string(), "components.0.name");
        assert_eq!(issue.suggestions.len(), 1);
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::warning(codes::ORPHANED_VARIANT, "orphaned variant 'tertiary'")
            .with_path(["styling", "variants", "variant", "tertiary"])
            .with_location(SourceLocation::new("button.json", 9, 2));

        assert_eq!(
            issue.to_string(),
            "button.json:10:3: warning[ORPHANED_VARIANT]: orphaned variant 'tertiary' (at styling.variants.variant.tertiary)"
        );
    }

    #[test]
    fn test_severity_to_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Warning.to_lsp(), 2);
        assert_eq!(Severity::Info.to_lsp(), 3);
    }
}
