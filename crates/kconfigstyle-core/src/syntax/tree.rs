//! Arena-allocated Kconfig syntax tree
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Ownership
//! flows from a block to its children; the `parent` index on each node is a
//! plain back-reference for rules that need context such as nesting depth.

use std::fmt;
use std::ops::Range;

use super::token::{Keyword, Token, TokenKind};
use crate::span::{LineIndex, Position, Span};

/// Index of a node in its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Blank,
    /// Only a comment, possibly indented
    Comment,
    /// One physical line of help text
    Help,
    Code,
}

/// One logical line: a physical line plus any `\`-continued lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    /// All tokens of the line, indentation and terminator included
    pub tokens: Range<usize>,
    /// Leading `Indent` token
    pub indent: Option<usize>,
    /// First token carrying meaning
    pub head: Option<usize>,
    /// Comment token, whole-line or trailing
    pub comment: Option<usize>,
    /// Terminating `Newline` token, absent on the last line of a file
    pub newline: Option<usize>,
    pub continuations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Bool,
    Tristate,
    Int,
    Hex,
    String,
}

impl SymbolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolType::Bool => "bool",
            SymbolType::Tristate => "tristate",
            SymbolType::Int => "int",
            SymbolType::Hex => "hex",
            SymbolType::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Type(SymbolType),
    DefBool,
    DefTristate,
    Prompt,
    Default,
    DependsOn,
    Select,
    Imply,
    Range,
    Option,
    VisibleIf,
    Modules,
    Optional,
    Transitional,
    Help,
}

impl PropertyKind {
    pub fn from_keyword(kw: Keyword) -> Option<Self> {
        let kind = match kw {
            Keyword::Bool => PropertyKind::Type(SymbolType::Bool),
            Keyword::Tristate => PropertyKind::Type(SymbolType::Tristate),
            Keyword::Int => PropertyKind::Type(SymbolType::Int),
            Keyword::Hex => PropertyKind::Type(SymbolType::Hex),
            Keyword::String => PropertyKind::Type(SymbolType::String),
            Keyword::DefBool => PropertyKind::DefBool,
            Keyword::DefTristate => PropertyKind::DefTristate,
            Keyword::Prompt => PropertyKind::Prompt,
            Keyword::Default => PropertyKind::Default,
            Keyword::Depends => PropertyKind::DependsOn,
            Keyword::Select => PropertyKind::Select,
            Keyword::Imply => PropertyKind::Imply,
            Keyword::Range => PropertyKind::Range,
            Keyword::Option => PropertyKind::Option,
            Keyword::Visible => PropertyKind::VisibleIf,
            Keyword::Modules => PropertyKind::Modules,
            Keyword::Optional => PropertyKind::Optional,
            Keyword::Transitional => PropertyKind::Transitional,
            Keyword::Help => PropertyKind::Help,
            _ => return None,
        };
        Some(kind)
    }

    /// Ordering group used by style profiles
    pub fn group(&self) -> &'static str {
        match self {
            PropertyKind::Type(_) | PropertyKind::DefBool | PropertyKind::DefTristate => "type",
            PropertyKind::Prompt => "prompt",
            PropertyKind::Default => "default",
            PropertyKind::DependsOn => "depends",
            PropertyKind::Select => "select",
            PropertyKind::Imply => "imply",
            PropertyKind::Range => "range",
            PropertyKind::Option => "option",
            PropertyKind::VisibleIf => "visible",
            PropertyKind::Modules => "modules",
            PropertyKind::Optional => "optional",
            PropertyKind::Transitional => "transitional",
            PropertyKind::Help => "help",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Type(ty) => ty.as_str(),
            PropertyKind::DefBool => "def_bool",
            PropertyKind::DefTristate => "def_tristate",
            PropertyKind::Prompt => "prompt",
            PropertyKind::Default => "default",
            PropertyKind::DependsOn => "depends on",
            PropertyKind::Select => "select",
            PropertyKind::Imply => "imply",
            PropertyKind::Range => "range",
            PropertyKind::Option => "option",
            PropertyKind::VisibleIf => "visible if",
            PropertyKind::Modules => "modules",
            PropertyKind::Optional => "optional",
            PropertyKind::Transitional => "transitional",
            PropertyKind::Help => "help",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Help text attached to a `help` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpBlock {
    /// Logical lines of the text, interior blank lines included
    pub lines: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub kind: PropertyKind,
    pub line: usize,
    pub help: Option<HelpBlock>,
}

impl Property {
    /// Logical lines covered by the property, help text included
    pub fn lines(&self) -> Range<usize> {
        match &self.help {
            Some(help) if !help.lines.is_empty() => self.line..help.lines.end,
            _ => self.line..self.line + 1,
        }
    }
}

/// A line inside an entry or block header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryItem {
    Property(Property),
    Comment(usize),
    Blank(Range<usize>),
    /// Unrecognized line skipped by error recovery
    Invalid(usize),
}

impl EntryItem {
    pub fn lines(&self) -> Range<usize> {
        match self {
            EntryItem::Property(p) => p.lines(),
            EntryItem::Comment(line) | EntryItem::Invalid(line) => *line..*line + 1,
            EntryItem::Blank(lines) => lines.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Config,
    MenuConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub name: Option<String>,
    /// Token index of the symbol name
    pub name_token: Option<usize>,
    pub ty: Option<SymbolType>,
    pub header: usize,
    pub items: Vec<EntryItem>,
}

impl Entry {
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.items.iter().filter_map(|item| match item {
            EntryItem::Property(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// The whole file
    File,
    Menu,
    Choice,
    If,
}

impl BlockKind {
    pub fn opener(&self) -> Option<Keyword> {
        match self {
            BlockKind::File => None,
            BlockKind::Menu => Some(Keyword::Menu),
            BlockKind::Choice => Some(Keyword::Choice),
            BlockKind::If => Some(Keyword::If),
        }
    }

    pub fn terminator(&self) -> Option<Keyword> {
        match self {
            BlockKind::File => None,
            BlockKind::Menu => Some(Keyword::EndMenu),
            BlockKind::Choice => Some(Keyword::EndChoice),
            BlockKind::If => Some(Keyword::EndIf),
        }
    }

    pub fn from_terminator(kw: Keyword) -> Option<Self> {
        match kw {
            Keyword::EndMenu => Some(BlockKind::Menu),
            Keyword::EndChoice => Some(BlockKind::Choice),
            Keyword::EndIf => Some(BlockKind::If),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub header: Option<usize>,
    /// Menu title, choice symbol or `if` condition, whitespace-normalized
    pub label: Option<String>,
    /// Properties following the opener, such as `depends on` or `prompt`
    pub properties: Vec<EntryItem>,
    pub children: Vec<NodeId>,
    pub terminator: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Source,
    Rsource,
    Osource,
    Orsource,
    Comment,
    MainMenu,
    /// `NAME = value` and friends
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub line: usize,
    pub argument: Option<String>,
    pub properties: Vec<EntryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Entry(Entry),
    Block(Block),
    Directive(Directive),
    RawComment,
    BlankRun { count: usize },
    Invalid,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Entry(_) => "entry",
            NodeKind::Block(_) => "block",
            NodeKind::Directive(_) => "directive",
            NodeKind::RawComment => "comment",
            NodeKind::BlankRun { .. } => "blank",
            NodeKind::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Token indices covered by the node
    pub tokens: Range<usize>,
    /// Logical line indices covered by the node
    pub lines: Range<usize>,
}

/// One structural element, used to compare trees before and after edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub depth: usize,
    pub kind: &'static str,
    pub name: Option<String>,
    pub properties: usize,
}

/// A parsed file: source, tokens, logical lines and nodes
#[derive(Debug, Clone)]
pub struct Tree {
    source: String,
    tokens: Vec<Token>,
    lines: Vec<Line>,
    nodes: Vec<Node>,
    line_index: LineIndex,
}

impl Tree {
    pub(crate) fn from_parts(
        source: String,
        tokens: Vec<Token>,
        lines: Vec<Line>,
        nodes: Vec<Node>,
    ) -> Self {
        let line_index = LineIndex::new(&source);
        Self {
            source,
            tokens,
            lines,
            nodes,
            line_index,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_text(&self, idx: usize) -> &str {
        self.tokens[idx].text(&self.source)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> &Line {
        &self.lines[idx]
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Block(block) => &block.children,
            _ => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Enclosing nodes, innermost first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Number of enclosing menu/choice/if blocks
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .filter(|&a| match &self.node(a).kind {
                NodeKind::Block(block) => block.kind != BlockKind::File,
                _ => false,
            })
            .count()
    }

    /// Byte span of a node
    pub fn span(&self, id: NodeId) -> Span {
        self.token_range_span(&self.node(id).tokens)
    }

    /// Exact source text of a node
    pub fn text(&self, id: NodeId) -> &str {
        self.span(id).text(&self.source)
    }

    fn token_range_span(&self, range: &Range<usize>) -> Span {
        if range.is_empty() {
            let at = self
                .tokens
                .get(range.start)
                .map(|t| t.span.start)
                .unwrap_or_else(|| self.end_position());
            return Span::empty(at);
        }
        Span::new(
            self.tokens[range.start].span.start,
            self.tokens[range.end - 1].span.end,
        )
    }

    pub fn end_position(&self) -> Position {
        self.line_index.position(&self.source, self.source.len())
    }

    /// Byte span of a logical line, terminator included
    pub fn line_span(&self, idx: usize) -> Span {
        self.token_range_span(&self.lines[idx].tokens)
    }

    /// Span of a logical line without its terminator
    pub fn line_content_span(&self, idx: usize) -> Span {
        let line = &self.lines[idx];
        let end = match line.newline {
            Some(nl) => nl,
            None => line.tokens.end,
        };
        self.token_range_span(&(line.tokens.start..end))
    }

    /// Leading indentation of a logical line
    pub fn indent_text(&self, idx: usize) -> &str {
        let line = &self.lines[idx];
        match line.kind {
            LineKind::Help => {
                let text = self.line_content_span(idx).text(&self.source);
                &text[..text.len() - text.trim_start_matches([' ', '\t']).len()]
            }
            _ => line.indent.map(|t| self.token_text(t)).unwrap_or(""),
        }
    }

    /// Keyword starting a logical line
    pub fn head_keyword(&self, idx: usize) -> Option<Keyword> {
        self.lines[idx].head.and_then(|t| self.tokens[t].keyword())
    }

    /// Tokens of a line that carry meaning, in order
    pub fn significant_tokens(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.lines[idx]
            .tokens
            .clone()
            .filter(move |&t| !self.tokens[t].kind.is_trivia())
    }

    /// 1-based physical line number where a logical line starts
    pub fn line_number(&self, idx: usize) -> usize {
        self.line_span(idx).start.line
    }

    /// Structural outline: entries, blocks and directives with their depth
    pub fn outline(&self) -> Vec<OutlineItem> {
        let mut items = Vec::new();
        self.collect_outline(self.root(), 0, &mut items);
        items
    }

    fn collect_outline(&self, id: NodeId, depth: usize, out: &mut Vec<OutlineItem>) {
        match &self.node(id).kind {
            NodeKind::Entry(entry) => out.push(OutlineItem {
                depth,
                kind: match entry.kind {
                    EntryKind::Config => "config",
                    EntryKind::MenuConfig => "menuconfig",
                },
                name: entry.name.clone(),
                properties: entry.properties().count(),
            }),
            NodeKind::Directive(directive) => out.push(OutlineItem {
                depth,
                kind: "directive",
                name: directive.argument.clone(),
                properties: count_properties(&directive.properties),
            }),
            NodeKind::Block(block) => {
                let child_depth = if block.kind == BlockKind::File {
                    depth
                } else {
                    out.push(OutlineItem {
                        depth,
                        kind: block.kind.opener().map(|k| k.as_str()).unwrap_or("file"),
                        name: block.label.clone(),
                        properties: count_properties(&block.properties),
                    });
                    depth + 1
                };
                for &child in &block.children {
                    self.collect_outline(child, child_depth, out);
                }
            }
            NodeKind::RawComment | NodeKind::BlankRun { .. } | NodeKind::Invalid => {}
        }
    }
}

fn count_properties(items: &[EntryItem]) -> usize {
    items
        .iter()
        .filter(|item| matches!(item, EntryItem::Property(_)))
        .count()
}

/// Kind of token that ends a logical line's meaningful content
pub(crate) fn is_line_end(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Newline | TokenKind::BlankLine | TokenKind::Eof)
}
