//! Recursive-descent Kconfig parser with line-level error recovery
//!
//! Tokens are first grouped into logical lines; the parser then descends over
//! lines. A malformed line produces one error and is kept in the tree as an
//! `Invalid` node (or item), so every byte of the input stays reachable from
//! the root.

use std::fmt;
use std::ops::Range;

use tracing::trace;

use super::lexer::tokenize;
use super::token::{Keyword, Token, TokenKind};
use super::tree::{
    is_line_end, Block, BlockKind, Directive, DirectiveKind, Entry, EntryItem, EntryKind,
    HelpBlock, Line, LineKind, Node, NodeId, NodeKind, Property, PropertyKind, SymbolType, Tree,
};
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// Unrecognized characters, kept as `Unknown` tokens
    Lex,
    /// Structural problems
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span.start, self.message)
    }
}

/// Result of parsing one file
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: Tree,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn parse_errors(&self) -> impl Iterator<Item = &SyntaxError> {
        self.errors
            .iter()
            .filter(|e| e.kind == SyntaxErrorKind::Parse)
    }
}

/// Tokenize and parse `source`
pub fn parse(source: &str) -> Parse {
    parse_tokens(source, tokenize(source).collect())
}

/// Parse tokens previously produced by [`tokenize`] for `source`
pub fn parse_tokens(source: &str, tokens: Vec<Token>) -> Parse {
    let lines = group_lines(&tokens);
    let mut parser = Parser {
        source,
        tokens,
        lines,
        pos: 0,
        nodes: Vec::new(),
        errors: Vec::new(),
        open: Vec::new(),
    };
    parser.parse_file();
    parser.finish()
}

fn group_lines(tokens: &[Token]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::Eof => break,
            TokenKind::BlankLine => {
                lines.push(Line {
                    kind: LineKind::Blank,
                    tokens: i..i + 1,
                    indent: None,
                    head: None,
                    comment: None,
                    newline: None,
                    continuations: 0,
                });
                i += 1;
                continue;
            }
            _ => {}
        }

        let start = i;
        let mut line = Line {
            kind: LineKind::Code,
            tokens: start..start,
            indent: None,
            head: None,
            comment: None,
            newline: None,
            continuations: 0,
        };
        while i < tokens.len() {
            let kind = tokens[i].kind;
            if kind == TokenKind::Newline {
                line.newline = Some(i);
                i += 1;
                break;
            }
            if is_line_end(kind) {
                break;
            }
            match kind {
                TokenKind::Indent if i == start => line.indent = Some(i),
                TokenKind::Comment => line.comment = Some(i),
                TokenKind::LineContinuation => line.continuations += 1,
                TokenKind::HelpText => line.kind = LineKind::Help,
                k if !k.is_trivia() && line.head.is_none() => line.head = Some(i),
                _ => {}
            }
            i += 1;
        }
        line.tokens = start..i;
        if line.kind == LineKind::Code && line.head.is_none() {
            line.kind = if line.comment.is_some() {
                LineKind::Comment
            } else {
                LineKind::Blank
            };
        }
        lines.push(line);
    }

    lines
}

/// How a logical line starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    Blank,
    Comment,
    Help,
    Keyword(Keyword),
    Assignment,
    Other,
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    lines: Vec<Line>,
    pos: usize,
    nodes: Vec<Node>,
    errors: Vec<SyntaxError>,
    /// Kinds of the blocks currently open, outermost first
    open: Vec<BlockKind>,
}

impl<'s> Parser<'s> {
    fn finish(mut self) -> Parse {
        for token in &self.tokens {
            if token.kind != TokenKind::Unknown {
                continue;
            }
            let text = token.text(self.source);
            let message = if text.starts_with('"') || text.starts_with('\'') {
                "unterminated string literal".to_string()
            } else {
                format!("unexpected character `{}`", text.escape_debug())
            };
            self.errors.push(SyntaxError {
                kind: SyntaxErrorKind::Lex,
                message,
                span: token.span,
            });
        }
        self.errors.sort_by_key(|e| e.span.start.offset);

        let tree = Tree::from_parts(self.source.to_string(), self.tokens, self.lines, self.nodes);
        Parse {
            tree,
            errors: self.errors,
        }
    }

    fn parse_file(&mut self) {
        let root = self.alloc(
            NodeKind::Block(Block {
                kind: BlockKind::File,
                header: None,
                label: None,
                properties: Vec::new(),
                children: Vec::new(),
                terminator: None,
            }),
            None,
        );
        let children = self.parse_items(root);
        if let NodeKind::Block(block) = &mut self.nodes[root.0].kind {
            block.children = children;
        }
        let node = &mut self.nodes[root.0];
        node.lines = 0..self.lines.len();
        node.tokens = 0..self.tokens.len();
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            tokens: 0..0,
            lines: 0..0,
        });
        id
    }

    fn push_node(&mut self, kind: NodeKind, parent: NodeId, lines: Range<usize>) -> NodeId {
        let id = self.alloc(kind, Some(parent));
        self.set_lines(id, lines);
        id
    }

    fn set_lines(&mut self, id: NodeId, lines: Range<usize>) {
        let tokens = if lines.is_empty() {
            let at = self
                .lines
                .get(lines.start)
                .map(|l| l.tokens.start)
                .unwrap_or(self.tokens.len());
            at..at
        } else {
            self.lines[lines.start].tokens.start..self.lines[lines.end - 1].tokens.end
        };
        let node = &mut self.nodes[id.0];
        node.lines = lines;
        node.tokens = tokens;
    }

    fn head(&self, idx: usize) -> Head {
        let line = &self.lines[idx];
        match line.kind {
            LineKind::Blank => Head::Blank,
            LineKind::Comment => Head::Comment,
            LineKind::Help => Head::Help,
            LineKind::Code => {
                let Some(head) = line.head else {
                    return Head::Other;
                };
                if let Some(kw) = self.tokens[head].keyword() {
                    return Head::Keyword(kw);
                }
                if self.tokens[head].kind == TokenKind::Identifier {
                    let next = self.significant_after(idx, head);
                    if let Some(op) = next {
                        let text = self.tokens[op].text(self.source);
                        if self.tokens[op].kind == TokenKind::Operator
                            && matches!(text, "=" | ":=" | "+=" | "?=")
                        {
                            return Head::Assignment;
                        }
                    }
                }
                Head::Other
            }
        }
    }

    /// First meaningful token of line `idx` after token `after`
    fn significant_after(&self, idx: usize, after: usize) -> Option<usize> {
        (after + 1..self.lines[idx].tokens.end).find(|&t| !self.tokens[t].kind.is_trivia())
    }

    fn line_span(&self, idx: usize) -> Span {
        let line = &self.lines[idx];
        let end = line.newline.unwrap_or(line.tokens.end);
        if end == line.tokens.start {
            return Span::empty(self.tokens[line.tokens.start].span.start);
        }
        Span::new(
            self.tokens[line.tokens.start].span.start,
            self.tokens[end - 1].span.end,
        )
    }

    fn eof_span(&self) -> Span {
        self.tokens
            .last()
            .map(|t| Span::empty(t.span.end))
            .unwrap_or_default()
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        trace!(line = span.start.line, %message, "parse error");
        self.errors.push(SyntaxError {
            kind: SyntaxErrorKind::Parse,
            message,
            span,
        });
    }

    fn head_text(&self, idx: usize) -> String {
        self.lines[idx]
            .head
            .map(|t| self.tokens[t].text(self.source).to_string())
            .unwrap_or_default()
    }

    fn is_structural(kw: Keyword) -> bool {
        matches!(
            kw,
            Keyword::Config
                | Keyword::MenuConfig
                | Keyword::Menu
                | Keyword::Choice
                | Keyword::If
                | Keyword::EndMenu
                | Keyword::EndChoice
                | Keyword::EndIf
                | Keyword::Source
                | Keyword::Rsource
                | Keyword::Osource
                | Keyword::Orsource
                | Keyword::Comment
                | Keyword::MainMenu
        )
    }

    /// Skip from the current line to the next recognizable boundary
    fn skip_invalid(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.lines.len() {
            match self.head(self.pos) {
                Head::Blank | Head::Comment | Head::Assignment => break,
                Head::Keyword(kw) if Self::is_structural(kw) => break,
                _ => self.pos += 1,
            }
        }
        self.push_node(NodeKind::Invalid, parent, start..self.pos)
    }

    fn parse_items(&mut self, parent: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();

        while self.pos < self.lines.len() {
            let start = self.pos;
            let child = match self.head(start) {
                Head::Blank => {
                    while self.pos < self.lines.len() && self.head(self.pos) == Head::Blank {
                        self.pos += 1;
                    }
                    let count = self.pos - start;
                    self.push_node(NodeKind::BlankRun { count }, parent, start..self.pos)
                }
                Head::Comment => {
                    self.pos += 1;
                    self.push_node(NodeKind::RawComment, parent, start..self.pos)
                }
                Head::Help => {
                    self.error(self.line_span(start), "help text outside of an entry");
                    self.skip_invalid(parent)
                }
                Head::Assignment => self.parse_directive(parent, DirectiveKind::Assignment),
                Head::Other => {
                    let text = self.head_text(start);
                    self.error(self.line_span(start), format!("unexpected `{}`", text));
                    self.skip_invalid(parent)
                }
                Head::Keyword(kw) => match kw {
                    Keyword::Config => self.parse_entry(parent, EntryKind::Config),
                    Keyword::MenuConfig => self.parse_entry(parent, EntryKind::MenuConfig),
                    Keyword::Menu => self.parse_block(parent, BlockKind::Menu),
                    Keyword::Choice => self.parse_block(parent, BlockKind::Choice),
                    Keyword::If => self.parse_block(parent, BlockKind::If),
                    Keyword::Source => self.parse_directive(parent, DirectiveKind::Source),
                    Keyword::Rsource => self.parse_directive(parent, DirectiveKind::Rsource),
                    Keyword::Osource => self.parse_directive(parent, DirectiveKind::Osource),
                    Keyword::Orsource => self.parse_directive(parent, DirectiveKind::Orsource),
                    Keyword::Comment => self.parse_directive(parent, DirectiveKind::Comment),
                    Keyword::MainMenu => self.parse_directive(parent, DirectiveKind::MainMenu),
                    Keyword::EndMenu | Keyword::EndChoice | Keyword::EndIf => {
                        let closes = BlockKind::from_terminator(kw);
                        if closes.is_some_and(|k| self.open.contains(&k)) {
                            break;
                        }
                        let opener = closes.and_then(|k| k.opener()).map(|k| k.as_str());
                        self.error(
                            self.line_span(start),
                            format!(
                                "unexpected `{}` without a matching `{}`",
                                kw,
                                opener.unwrap_or("block")
                            ),
                        );
                        self.pos += 1;
                        self.push_node(NodeKind::Invalid, parent, start..self.pos)
                    }
                    _ => {
                        self.error(
                            self.line_span(start),
                            format!("`{}` outside of an entry", kw),
                        );
                        self.skip_invalid(parent)
                    }
                },
            };
            children.push(child);
        }

        children
    }

    /// Whether line `idx` continues the properties of the current entry
    fn is_property_line(&self, idx: usize) -> bool {
        match self.head(idx) {
            Head::Keyword(kw) => PropertyKind::from_keyword(kw).is_some(),
            Head::Other | Head::Help => self.lines[idx].indent.is_some(),
            _ => false,
        }
    }

    fn parse_properties(&mut self) -> Vec<EntryItem> {
        let mut items = Vec::new();

        loop {
            let mut next = self.pos;
            while next < self.lines.len()
                && matches!(self.head(next), Head::Blank | Head::Comment)
            {
                next += 1;
            }
            if next >= self.lines.len() || !self.is_property_line(next) {
                break;
            }

            while self.pos < next {
                if self.head(self.pos) == Head::Comment {
                    items.push(EntryItem::Comment(self.pos));
                    self.pos += 1;
                } else {
                    let start = self.pos;
                    while self.pos < next && self.head(self.pos) == Head::Blank {
                        self.pos += 1;
                    }
                    items.push(EntryItem::Blank(start..self.pos));
                }
            }

            let property = match self.head(next) {
                Head::Keyword(kw) => PropertyKind::from_keyword(kw),
                _ => None,
            };
            match property {
                Some(kind) => items.push(EntryItem::Property(self.parse_property(next, kind))),
                None => {
                    let text = self.head_text(next);
                    self.error(self.line_span(next), format!("unexpected `{}`", text));
                    items.push(EntryItem::Invalid(next));
                    self.pos = next + 1;
                }
            }
        }

        items
    }

    fn parse_property(&mut self, idx: usize, kind: PropertyKind) -> Property {
        self.pos = idx + 1;

        let head = self.lines[idx].head.unwrap_or(self.lines[idx].tokens.start);
        let required = match kind {
            PropertyKind::DependsOn => Some(Keyword::On),
            PropertyKind::VisibleIf => Some(Keyword::If),
            _ => None,
        };
        if let Some(required) = required {
            let next = self.significant_after(idx, head);
            if !next.is_some_and(|t| self.tokens[t].is_keyword(required)) {
                self.error(
                    self.line_span(idx),
                    format!("expected `{}` after `{}`", required, self.head_text(idx)),
                );
            }
        }

        let help = if kind == PropertyKind::Help {
            let start = self.pos;
            let mut end = start;
            let mut k = start;
            while k < self.lines.len() {
                match self.head(k) {
                    Head::Help => {
                        k += 1;
                        end = k;
                    }
                    Head::Blank => k += 1,
                    _ => break,
                }
            }
            self.pos = end;
            Some(HelpBlock { lines: start..end })
        } else {
            None
        };

        Property {
            kind,
            line: idx,
            help,
        }
    }

    fn parse_entry(&mut self, parent: NodeId, kind: EntryKind) -> NodeId {
        let header = self.pos;
        let head = self.lines[header].head.unwrap_or(self.lines[header].tokens.start);
        let name_token = self
            .significant_after(header, head)
            .filter(|&t| self.tokens[t].kind == TokenKind::Identifier);
        let name = name_token.map(|t| self.tokens[t].text(self.source).to_string());
        if name.is_none() {
            self.error(
                self.line_span(header),
                format!("expected a symbol name after `{}`", self.head_text(header)),
            );
        }

        self.pos += 1;
        let items = self.parse_properties();
        let ty = items.iter().find_map(|item| match item {
            EntryItem::Property(Property {
                kind: PropertyKind::Type(ty),
                ..
            }) => Some(*ty),
            EntryItem::Property(Property {
                kind: PropertyKind::DefBool,
                ..
            }) => Some(SymbolType::Bool),
            EntryItem::Property(Property {
                kind: PropertyKind::DefTristate,
                ..
            }) => Some(SymbolType::Tristate),
            _ => None,
        });

        let entry = Entry {
            kind,
            name,
            name_token,
            ty,
            header,
            items,
        };
        self.push_node(NodeKind::Entry(entry), parent, header..self.pos)
    }

    fn parse_block(&mut self, parent: NodeId, kind: BlockKind) -> NodeId {
        let header = self.pos;
        let id = self.alloc(
            NodeKind::Block(Block {
                kind,
                header: Some(header),
                label: None,
                properties: Vec::new(),
                children: Vec::new(),
                terminator: None,
            }),
            Some(parent),
        );

        let label = self.block_label(header, kind);
        if label.is_none() {
            match kind {
                BlockKind::Menu => self.error(self.line_span(header), "expected a title after `menu`"),
                BlockKind::If => self.error(self.line_span(header), "expected a condition after `if`"),
                _ => {}
            }
        }

        self.pos += 1;
        let properties = if kind == BlockKind::If {
            Vec::new()
        } else {
            self.parse_properties()
        };

        self.open.push(kind);
        let children = self.parse_items(id);
        self.open.pop();

        let opener = kind.opener().map(|k| k.as_str()).unwrap_or("block");
        let expected = kind.terminator().map(|k| k.as_str()).unwrap_or("end");
        let missing = format!(
            "missing `{}` for `{}` opened on line {}",
            expected,
            opener,
            self.line_span(header).start.line
        );
        let terminator = if self.pos < self.lines.len() {
            match self.head(self.pos) {
                Head::Keyword(kw) if BlockKind::from_terminator(kw) == Some(kind) => {
                    self.pos += 1;
                    Some(self.pos - 1)
                }
                _ => {
                    self.error(self.line_span(self.pos), missing);
                    None
                }
            }
        } else {
            self.error(self.eof_span(), missing);
            None
        };

        if let NodeKind::Block(block) = &mut self.nodes[id.0].kind {
            block.label = label;
            block.properties = properties;
            block.children = children;
            block.terminator = terminator;
        }
        self.set_lines(id, header..self.pos);
        id
    }

    fn block_label(&self, idx: usize, kind: BlockKind) -> Option<String> {
        let head = self.lines[idx].head?;
        match kind {
            BlockKind::Menu => self.string_argument(idx, head),
            BlockKind::Choice => self
                .significant_after(idx, head)
                .filter(|&t| self.tokens[t].kind == TokenKind::Identifier)
                .map(|t| self.tokens[t].text(self.source).to_string()),
            BlockKind::If => self.expression_text(idx, head),
            BlockKind::File => None,
        }
    }

    fn string_argument(&self, idx: usize, head: usize) -> Option<String> {
        let t = self.significant_after(idx, head)?;
        if self.tokens[t].kind != TokenKind::StringLiteral {
            return None;
        }
        let text = self.tokens[t].text(self.source);
        Some(text[1..text.len() - 1].to_string())
    }

    /// Unquoted path such as `source Kconfig.defconfig`
    fn word_argument(&self, idx: usize, head: usize) -> Option<String> {
        let t = self.significant_after(idx, head)?;
        if self.tokens[t].kind != TokenKind::Identifier {
            return None;
        }
        Some(self.tokens[t].text(self.source).to_string())
    }

    /// Tokens after `head` up to any comment, whitespace collapsed
    fn expression_text(&self, idx: usize, head: usize) -> Option<String> {
        let mut out = String::new();
        let mut pending_space = false;
        for t in head + 1..self.lines[idx].tokens.end {
            match self.tokens[t].kind {
                TokenKind::Comment | TokenKind::Newline => break,
                TokenKind::Whitespace | TokenKind::LineContinuation => pending_space = true,
                _ => {
                    if pending_space && !out.is_empty() {
                        out.push(' ');
                    }
                    pending_space = false;
                    out.push_str(self.tokens[t].text(self.source));
                }
            }
        }
        (!out.is_empty()).then_some(out)
    }

    fn parse_directive(&mut self, parent: NodeId, kind: DirectiveKind) -> NodeId {
        let line = self.pos;
        let head = self.lines[line].head.unwrap_or(self.lines[line].tokens.start);
        let argument = match kind {
            DirectiveKind::Assignment => Some(self.head_text(line)),
            DirectiveKind::Comment | DirectiveKind::MainMenu => self.string_argument(line, head),
            _ => self
                .string_argument(line, head)
                .or_else(|| self.word_argument(line, head)),
        };
        if argument.is_none() {
            let expected = match kind {
                DirectiveKind::Comment | DirectiveKind::MainMenu => "a string",
                _ => "a path",
            };
            self.error(
                self.line_span(line),
                format!("expected {} after `{}`", expected, self.head_text(line)),
            );
        }

        self.pos += 1;
        let properties = if kind == DirectiveKind::Comment {
            self.parse_properties()
        } else {
            Vec::new()
        };

        let directive = Directive {
            kind,
            line,
            argument,
            properties,
        };
        self.push_node(NodeKind::Directive(directive), parent, line..self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(tree: &Tree) -> String {
        let mut out: String = tree
            .children(tree.root())
            .iter()
            .map(|&c| tree.text(c))
            .collect();
        if let Some(eof) = tree.tokens().last() {
            out.push_str(eof.text(tree.source()));
        }
        out
    }

    fn first_entry(tree: &Tree) -> &Entry {
        tree.nodes()
            .find_map(|(_, n)| match &n.kind {
                NodeKind::Entry(e) => Some(e),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_lossless_round_trip() {
        let sources = [
            "config FOO\n\tbool \"Foo\"\n\tdefault y\n",
            "mainmenu \"Test\"\n\nmenu \"Net\"\n\tdepends on NET\n\nconfig A\n\tbool\n\thelp\n\t  Help.\n\n\t  More.\n\nendmenu\n",
            "if FOO\nsource \"bar/Kconfig\"\nendif # FOO\n",
            "choice\n\tprompt \"Pick\"\n\nconfig X\n\tbool \"X\"\n\nendchoice",
            "garbage line\nconfig\n\tbool\nendif\n# trailing\n\n\n",
            "",
        ];
        for source in sources {
            let parse = parse(source);
            assert_eq!(reconstruct(&parse.tree), source);
        }
    }

    #[test]
    fn test_entry_properties() {
        let parse = parse("config FOO\n\tbool \"Foo\"\n\tdefault y\n\tdepends on BAR\n");
        assert!(parse.errors.is_empty());

        let entry = first_entry(&parse.tree);
        assert_eq!(entry.name.as_deref(), Some("FOO"));
        assert_eq!(entry.ty, Some(super::SymbolType::Bool));
        let kinds: Vec<PropertyKind> = entry.properties().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PropertyKind::Type(super::SymbolType::Bool),
                PropertyKind::Default,
                PropertyKind::DependsOn
            ]
        );
    }

    #[test]
    fn test_unindented_property_stays_in_entry() {
        let parse = parse("config FOO\n\tbool \"Foo\"\ndefault y\n");
        assert!(parse.errors.is_empty());
        let entry = first_entry(&parse.tree);
        assert_eq!(entry.properties().count(), 2);
    }

    #[test]
    fn test_help_block_excludes_trailing_blanks() {
        let source = "config A\n\tbool\n\thelp\n\t  One.\n\n\t  Two.\n\nconfig B\n\tbool\n";
        let parse = parse(source);
        let tree = &parse.tree;
        let entry = first_entry(tree);
        let help = entry
            .properties()
            .find(|p| p.kind == PropertyKind::Help)
            .and_then(|p| p.help.clone())
            .unwrap();
        assert_eq!(help.lines.len(), 3);

        let root_children = tree.children(tree.root());
        assert_eq!(root_children.len(), 3);
        assert!(matches!(
            tree.node(root_children[1]).kind,
            NodeKind::BlankRun { count: 1 }
        ));
    }

    #[test]
    fn test_unterminated_menu() {
        let source = "menu \"X\"\n\nconfig A\n\tbool \"A\"\n";
        let parse = parse(source);

        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.start.offset, source.len());
        assert!(errors[0].message.contains("missing `endmenu`"));

        let tree = &parse.tree;
        let menu = tree.children(tree.root())[0];
        match &tree.node(menu).kind {
            NodeKind::Block(block) => {
                assert_eq!(block.kind, BlockKind::Menu);
                assert_eq!(block.label.as_deref(), Some("X"));
                assert!(block.terminator.is_none());
                assert_eq!(block.children.len(), 2);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_blocks_and_parents() {
        let source = "menu \"A\"\nif B\nconfig C\n\tbool\nendif\nendmenu\n";
        let parse = parse(source);
        assert!(parse.errors.is_empty());

        let tree = &parse.tree;
        let (entry_id, _) = tree
            .nodes()
            .find(|(_, n)| matches!(n.kind, NodeKind::Entry(_)))
            .unwrap();
        assert_eq!(tree.depth(entry_id), 2);
        assert_eq!(tree.ancestors(entry_id).count(), 3);
    }

    #[test]
    fn test_mismatched_terminator_closes_inner() {
        let source = "menu \"A\"\nif B\nconfig C\n\tbool\nendmenu\n";
        let parse = parse(source);
        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("missing `endif`"));
        assert_eq!(errors[0].span.start.line, 5);
    }

    #[test]
    fn test_stray_terminator() {
        let parse = parse("config A\n\tbool\nendchoice\nconfig B\n\tbool\n");
        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("without a matching `choice`"));
        assert_eq!(parse.tree.outline().len(), 2);
    }

    #[test]
    fn test_recovery_skips_to_next_keyword() {
        let source = "bogus stuff here\n\tmore bogus\nconfig GOOD\n\tbool\n";
        let parse = parse(source);
        assert_eq!(parse.parse_errors().count(), 1);
        let outline = parse.tree.outline();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].name.as_deref(), Some("GOOD"));
    }

    #[test]
    fn test_property_outside_entry() {
        let parse = parse("\tdefault y\nconfig A\n\tbool\n");
        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("outside of an entry"));
    }

    #[test]
    fn test_directives() {
        let source = "source \"a/Kconfig\"\nrsource \"b/Kconfig\"\ncomment \"Note\"\n\tdepends on X\nFOO := bar\n";
        let parse = parse(source);
        assert!(parse.errors.is_empty());
        let kinds: Vec<DirectiveKind> = parse
            .tree
            .nodes()
            .filter_map(|(_, n)| match &n.kind {
                NodeKind::Directive(d) => Some(d.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                DirectiveKind::Source,
                DirectiveKind::Rsource,
                DirectiveKind::Comment,
                DirectiveKind::Assignment
            ]
        );
    }

    #[test]
    fn test_source_accepts_bare_path() {
        let parse = parse("source Kconfig.test\nosource $(ZEPHYR_BASE)/boards/Kconfig\n");
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        let arguments: Vec<Option<String>> = parse
            .tree
            .nodes()
            .filter_map(|(_, n)| match &n.kind {
                NodeKind::Directive(d) => Some(d.argument.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            arguments,
            vec![
                Some("Kconfig.test".to_string()),
                Some("$(ZEPHYR_BASE)/boards/Kconfig".to_string())
            ]
        );
    }

    #[test]
    fn test_source_without_path() {
        let parse = parse("source\ncomment Note\n");
        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("expected a path after `source`"));
        assert!(errors[1].message.contains("expected a string after `comment`"));
    }

    #[test]
    fn test_if_label_normalized() {
        let parse = parse("if A &&   \\\n\tB\nendif\n");
        let tree = &parse.tree;
        let block = tree.children(tree.root())[0];
        match &tree.node(block).kind {
            NodeKind::Block(b) => assert_eq!(b.label.as_deref(), Some("A && B")),
            _ => panic!("expected block"),
        }
    }

    #[test]
    fn test_lex_errors_reported() {
        let parse = parse("config A\n\tbool \"A`\"\n\tdefault `\n");
        let lex: Vec<&SyntaxError> = parse
            .errors
            .iter()
            .filter(|e| e.kind == SyntaxErrorKind::Lex)
            .collect();
        assert_eq!(lex.len(), 1);
        assert!(lex[0].message.contains("unexpected character"));
    }

    #[test]
    fn test_missing_symbol_name() {
        let parse = parse("config\n\tbool\n");
        let errors: Vec<&SyntaxError> = parse.parse_errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("symbol name"));
    }

    #[test]
    fn test_comment_inside_entry() {
        let parse = parse("config A\n\tbool\n# about default\n\tdefault y\n# after\nconfig B\n");
        let entry = first_entry(&parse.tree);
        assert!(matches!(entry.items[1], EntryItem::Comment(_)));
        assert_eq!(entry.items.len(), 3);
        let tree = &parse.tree;
        assert!(matches!(
            tree.node(tree.children(tree.root())[1]).kind,
            NodeKind::RawComment
        ));
    }
}
