//! Kconfig tokenizer, syntax tree and parser

mod lexer;
mod parser;
mod token;
mod tree;

pub use lexer::{indent_width, tokenize, Lexer, TAB_STOP};
pub use parser::{parse, parse_tokens, Parse, SyntaxError, SyntaxErrorKind};
pub use token::{Keyword, Token, TokenKind};
pub use tree::{
    Block, BlockKind, Directive, DirectiveKind, Entry, EntryItem, EntryKind, HelpBlock, Line,
    LineKind, Node, NodeId, NodeKind, OutlineItem, Property, PropertyKind, SymbolType, Tree,
};
