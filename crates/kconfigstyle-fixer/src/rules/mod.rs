//! Style rules for Kconfig formatting
//!
//! Each rule is a pure function of the parsed tree and its profile
//! parameters. Rules report diagnostics and may attach fixes; they never
//! modify the tree.

mod registry;
pub mod comments;
pub mod help;
pub mod naming;
pub mod structure;
pub mod whitespace;

pub use registry::{RuleInfo, RuleRegistry};

use std::ops::Range;

use kconfigstyle_core::syntax::{
    Block, BlockKind, Directive, Entry, EntryItem, LineKind, NodeId, Tree,
};
use kconfigstyle_core::{walk, Span, Visitor};

use crate::config::{Layout, RuleConfigError, RuleParams, StyleProfile, INDENTATION_RULE};
use crate::diagnostic::{Diagnostic, Severity};

/// A formatting rule that can be evaluated against a parsed Kconfig file
pub trait Rule: Send + Sync {
    /// Identifier used in profiles and diagnostics, e.g. `trailing-whitespace`
    fn id(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Whether diagnostics of this rule carry fixes
    fn is_fixable(&self) -> bool {
        true
    }

    /// Check the tree and return diagnostics
    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError>;
}

/// Everything a rule sees while checking one file
pub struct RuleContext<'a> {
    pub tree: &'a Tree,
    pub profile: &'a StyleProfile,
    pub params: RuleParams<'a>,
    pub severity: Severity,
    rule: &'static str,
}

impl<'a> RuleContext<'a> {
    pub fn new(tree: &'a Tree, profile: &'a StyleProfile, rule: &dyn Rule) -> Self {
        let id = rule.id();
        let severity = profile
            .setting(id)
            .and_then(|s| s.severity)
            .unwrap_or_else(|| rule.default_severity());
        Self {
            tree,
            profile,
            params: profile.params(id),
            severity,
            rule: id,
        }
    }

    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    /// Indentation layout shared by the whitespace and help rules
    ///
    /// Invalid `indentation` parameters are reported by that rule only; every
    /// other rule falls back to the layout of the profile's preset.
    pub fn layout(&self) -> Result<Layout, RuleConfigError> {
        match Layout::from_profile(self.profile) {
            Ok(layout) => Ok(layout),
            Err(err) if self.rule == INDENTATION_RULE => Err(err),
            Err(_) => Ok(Layout::fallback(&self.profile.name)),
        }
    }

    /// Span of a byte range of the source
    pub fn span(&self, start: usize, end: usize) -> Span {
        let index = self.tree.line_index();
        Span::new(
            index.position(self.source(), start),
            index.position(self.source(), end),
        )
    }

    /// Diagnostic of the current rule with its configured severity
    pub fn diagnostic(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(self.rule, self.severity, message, span)
    }
}

/// What a logical line is, for indentation purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// Entry or block header, block terminator or directive
    Item { depth: usize },
    /// Property line or comment inside an entry
    Property { depth: usize },
    /// Stand-alone comment between items
    Comment { depth: usize },
    HelpText { depth: usize },
    /// Blank, invalid or otherwise unchecked
    Skip,
}

/// Help text of one `help` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRegion {
    /// Nesting depth of the owning entry
    pub depth: usize,
    /// The `help` line
    pub help_line: usize,
    /// Text lines, interior blank lines included
    pub lines: Range<usize>,
}

/// Role of every logical line of a tree, computed with one walk
#[derive(Debug, Clone)]
pub struct LineMap {
    roles: Vec<LineRole>,
    help: Vec<HelpRegion>,
}

impl LineMap {
    pub fn new(tree: &Tree) -> Self {
        let mut map = Self {
            roles: vec![LineRole::Skip; tree.lines().len()],
            help: Vec::new(),
        };
        walk(tree, &mut map);
        map
    }

    pub fn role(&self, line: usize) -> LineRole {
        self.roles.get(line).copied().unwrap_or(LineRole::Skip)
    }

    pub fn roles(&self) -> impl Iterator<Item = (usize, LineRole)> + '_ {
        self.roles.iter().copied().enumerate()
    }

    pub fn help_regions(&self) -> &[HelpRegion] {
        &self.help
    }

    fn set(&mut self, line: usize, role: LineRole) {
        if let Some(slot) = self.roles.get_mut(line) {
            *slot = role;
        }
    }

    fn mark_items(&mut self, tree: &Tree, items: &[EntryItem], depth: usize) {
        for item in items {
            match item {
                EntryItem::Property(property) => {
                    self.set(property.line, LineRole::Property { depth });
                    if let Some(help) = &property.help {
                        for line in help.lines.clone() {
                            if tree.line(line).kind == LineKind::Help {
                                self.set(line, LineRole::HelpText { depth });
                            }
                        }
                        if !help.lines.is_empty() {
                            self.help.push(HelpRegion {
                                depth,
                                help_line: property.line,
                                lines: help.lines.clone(),
                            });
                        }
                    }
                }
                EntryItem::Comment(line) => self.set(*line, LineRole::Property { depth }),
                EntryItem::Blank(_) | EntryItem::Invalid(_) => {}
            }
        }
    }
}

impl Visitor for LineMap {
    fn visit_entry(&mut self, tree: &Tree, _id: NodeId, entry: &Entry, depth: usize) {
        self.set(entry.header, LineRole::Item { depth });
        self.mark_items(tree, &entry.items, depth);
    }

    fn visit_block(&mut self, tree: &Tree, _id: NodeId, block: &Block, depth: usize) -> bool {
        if block.kind != BlockKind::File {
            if let Some(header) = block.header {
                self.set(header, LineRole::Item { depth });
            }
            self.mark_items(tree, &block.properties, depth);
        }
        true
    }

    fn leave_block(&mut self, _tree: &Tree, _id: NodeId, block: &Block, depth: usize) {
        if let Some(terminator) = block.terminator {
            self.set(terminator, LineRole::Item { depth });
        }
    }

    fn visit_directive(&mut self, tree: &Tree, _id: NodeId, directive: &Directive, depth: usize) {
        self.set(directive.line, LineRole::Item { depth });
        self.mark_items(tree, &directive.properties, depth);
    }

    fn visit_raw_comment(&mut self, tree: &Tree, id: NodeId, depth: usize) {
        for line in tree.node(id).lines.clone() {
            self.set(line, LineRole::Comment { depth });
        }
    }
}

/// Byte offset where a logical line's indentation ends
pub(crate) fn indent_end(tree: &Tree, line: usize) -> usize {
    tree.line_span(line).start.offset + tree.indent_text(line).len()
}
