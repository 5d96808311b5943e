//! Source positions and spans

use std::fmt;

/// A location in source text
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with columns
/// counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of the first byte of a file
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at a position
    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Smallest span covering both `self` and `other`
    pub fn cover(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice the covered text out of `source`
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start.offset..self.end.offset]
    }
}

/// Byte offset to (line, column) lookup for one source text
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Resolve a byte offset into a full position
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let offset = offset.min(source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = source[line_start..offset].chars().count() + 1;
        Position::new(offset, line_idx + 1, column)
    }

    /// Byte offset where a 1-based line starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let source = "ab\ncd\n\nef";
        let index = LineIndex::new(source);

        assert_eq!(index.position(source, 0), Position::new(0, 1, 1));
        assert_eq!(index.position(source, 1), Position::new(1, 1, 2));
        assert_eq!(index.position(source, 3), Position::new(3, 2, 1));
        assert_eq!(index.position(source, 6), Position::new(6, 3, 1));
        assert_eq!(index.position(source, 8), Position::new(8, 4, 2));
    }

    #[test]
    fn test_columns_count_chars() {
        let source = "é=x";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 2).column, 2);
    }

    #[test]
    fn test_line_start() {
        let index = LineIndex::new("a\nb\n");
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_start(2), Some(2));
        assert_eq!(index.line_start(3), Some(4));
        assert_eq!(index.line_start(4), None);
        assert_eq!(index.line_start(0), None);
    }

    #[test]
    fn test_span_cover() {
        let a = Span::new(Position::new(2, 1, 3), Position::new(4, 1, 5));
        let b = Span::new(Position::new(0, 1, 1), Position::new(3, 1, 4));
        let c = a.cover(b);
        assert_eq!(c.start.offset, 0);
        assert_eq!(c.end.offset, 4);
        assert_eq!(c.len(), 4);
    }
}
