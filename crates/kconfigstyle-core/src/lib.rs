//! kconfigstyle-core: Kconfig syntax and text editing primitives
//!
//! This crate provides:
//! - `tokenize()`: Lazy, lossless Kconfig tokenizer
//! - `parse()`: Error-tolerant parser building an arena `Tree`
//! - `Edit` / `apply_edits()`: Span-based text replacement
//! - `Visitor`: Trait for walking a parsed tree with nesting depth

mod edit;
pub mod span;
pub mod syntax;
pub mod visitor;

pub use edit::{apply_edits, Edit, EditError};
pub use span::{LineIndex, Position, Span};
pub use syntax::{parse, tokenize, Parse, SyntaxError, SyntaxErrorKind, Tree};
pub use visitor::{walk, Visitor};
