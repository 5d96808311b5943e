//! Span-based text editing

use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// A single text replacement over byte offsets `start..end`
///
/// An edit with `start == end` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(
        start: usize,
        end: usize,
        replacement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    /// Insert text at `offset`
    pub fn insert(offset: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(offset, offset, text, message)
    }

    /// Delete `start..end`
    pub fn delete(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self::new(start, end, String::new(), message)
    }

    /// Get the byte offset where this edit starts
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// Get the byte offset where this edit ends
    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Whether two edits touch the same text
    ///
    /// Edits sharing a start offset conflict too, since their relative order
    /// would be ambiguous when one of them is an insertion.
    pub fn conflicts_with(&self, other: &Edit) -> bool {
        self.start == other.start || (self.start < other.end && other.start < self.end)
    }
}

/// Apply edits to `source` in one forward copy-and-splice pass
///
/// Offsets always refer to the original `source`, so edits never need
/// re-offsetting. Edits may be given in any order.
///
/// # Returns
/// * `Ok(String)` - The modified source
/// * `Err(EditError)` - If edits overlap or are out of bounds
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.end));

    let len = source.len();
    for (i, edit) in sorted.iter().enumerate() {
        if edit.start > edit.end || edit.end > len {
            return Err(EditError::SpanOutOfBounds {
                start: edit.start,
                end: edit.end,
                len,
            });
        }
        if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
            return Err(EditError::NotCharBoundary {
                start: edit.start,
                end: edit.end,
            });
        }
        if i > 0 && sorted[i - 1].conflicts_with(edit) {
            return Err(EditError::OverlappingEdits(edit.start));
        }
    }

    let growth: isize = sorted
        .iter()
        .map(|e| e.replacement.len() as isize - (e.end - e.start) as isize)
        .sum();
    let mut result = String::with_capacity((len as isize + growth.max(0)) as usize);
    let mut cursor = 0;

    for edit in sorted {
        result.push_str(&source[cursor..edit.start]);
        result.push_str(&edit.replacement);
        cursor = edit.end;
    }
    result.push_str(&source[cursor..]);

    Ok(result)
}
