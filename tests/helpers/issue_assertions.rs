//! Issue assertion helpers.

use specforge::{CompileResult, Severity, ValidationIssue};

pub fn codes_of(issues: &[ValidationIssue]) -> Vec<&'static str> {
    issues.iter().map(|i| i.code).collect()
}

pub fn with_code<'a>(issues: &'a [ValidationIssue], code: &str) -> Vec<&'a ValidationIssue> {
    issues.iter().filter(|i| i.code == code).collect()
}

pub fn errors(result: &CompileResult) -> Vec<&ValidationIssue> {
    result
        .issues()
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .collect()
}

/// Assert a compile produced no errors.
pub fn assert_no_errors(result: &CompileResult) {
    let errors = errors(result);
    assert!(
        errors.is_empty(),
        "Expected no errors, got {} error(s):\n{}",
        errors.len(),
        errors
            .iter()
            .map(|e| format!("  {e}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
    assert!(result.success);
}
