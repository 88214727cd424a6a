//! Source coordinates for tokens, AST nodes and errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a source file, 1-based in both axes.
///
/// Every token and AST node carries one so that errors anywhere in the
/// pipeline can point back at the offending piece of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Path of the file the node came from (includes keep their own path).
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, in bytes.
    pub column: u32,
}

impl Coordinate {
    /// Create a coordinate.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Byte offsets of line starts, for mapping lexer spans to coordinates.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// Map a byte offset to a coordinate in `file`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn coordinate(&self, file: &str, offset: usize) -> Coordinate {
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1] + 1;
        Coordinate::new(file, line as u32, column as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display() {
        let c = Coordinate::new("bell.qasm", 3, 14);
        assert_eq!(format!("{c}"), "bell.qasm:3:14");
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");

        assert_eq!(index.coordinate("f", 0), Coordinate::new("f", 1, 1));
        assert_eq!(index.coordinate("f", 1), Coordinate::new("f", 1, 2));
        assert_eq!(index.coordinate("f", 3), Coordinate::new("f", 2, 1));
        assert_eq!(index.coordinate("f", 6), Coordinate::new("f", 3, 1));
        assert_eq!(index.coordinate("f", 8), Coordinate::new("f", 4, 2));
    }
}
