/// Position tracking for parsed nodes
///
/// Stores the source location (line/column) of raw document nodes for
/// diagnostics and editor tooling.
use std::fmt;
use std::sync::Arc;

use text_size::TextSize;

/// A position in source text (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Location of a node inside a source document.
///
/// Lines and columns are 0-indexed; `Display` renders them 1-indexed the way
/// compilers print them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Location covering the start of a file.
    pub fn file_start(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 0, 0)
    }

    /// Create a location spanning `start..end`.
    pub fn span(file: impl Into<Arc<str>>, start: Position, end: Position) -> Self {
        Self {
            file: file.into(),
            line: start.line,
            column: start.column,
            end_line: Some(end.line),
            end_column: Some(end.column),
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// End position, falling back to the start for point locations.
    pub fn end(&self) -> Position {
        Position::new(
            self.end_line.unwrap_or(self.line),
            self.end_column.unwrap_or(self.column),
        )
    }

    /// Check if a position falls within this location
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start() && position <= self.end()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line + 1, self.column + 1)
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first character of every line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-indexed line/column.
    ///
    /// Columns count bytes, which matches character columns for ASCII input.
    pub fn position(&self, offset: TextSize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        Position::new(line as u32, column.into())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
