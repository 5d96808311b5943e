//! Whitespace rules for Kconfig formatting
//!
//! These rules handle indentation, trailing whitespace, blank lines
//! and line length.

mod blank_lines;
mod indentation;
mod line_length;
mod trailing_whitespace;

pub use blank_lines::BlankLinesRule;
pub use indentation::IndentationRule;
pub use line_length::{display_width, LineLengthRule};
pub use trailing_whitespace::TrailingWhitespaceRule;
