use super::issue::{Severity, ValidationIssue};

/// Append-only issue list owned by one compile invocation.
#[derive(Clone, Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Get issues reported against a specific file.
    pub fn issues_for_file(&self, file: &str) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.location.as_ref().is_some_and(|l| &*l.file == file))
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.is_error())
    }

    /// Check whether any error was added after `mark` (a previous [`len`](Self::len)).
    pub fn has_errors_since(&self, mark: usize) -> bool {
        self.issues.iter().skip(mark).any(|i| i.is_error())
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}
