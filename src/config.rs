//! Compiler configuration.

use crate::base::constants::REFERENCE_SIGIL;

/// Options for one [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Parse documents on the rayon pool.
    pub parallel_parse: bool,
    /// Leading character of token references.
    pub reference_sigil: char,
    /// Report unknown fields as errors instead of warnings.
    pub strict_unknown_fields: bool,
    /// Warn when a value references a deprecated token.
    pub deprecated_reference_warnings: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            parallel_parse: true,
            reference_sigil: REFERENCE_SIGIL,
            strict_unknown_fields: false,
            deprecated_reference_warnings: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel_parse(mut self, parallel: bool) -> Self {
        self.parallel_parse = parallel;
        self
    }

    pub fn with_reference_sigil(mut self, sigil: char) -> Self {
        self.reference_sigil = sigil;
        self
    }

    pub fn with_strict_unknown_fields(mut self, strict: bool) -> Self {
        self.strict_unknown_fields = strict;
        self
    }

    pub fn with_deprecated_reference_warnings(mut self, enabled: bool) -> Self {
        self.deprecated_reference_warnings = enabled;
        self
    }
}
