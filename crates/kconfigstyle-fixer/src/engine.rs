//! Rule engine: evaluates an ordered rule set against a parsed file

use std::sync::Arc;

use kconfigstyle_core::{parse, Position, Span, Tree};
use tracing::{debug, warn};

use crate::config::StyleProfile;
use crate::diagnostic::{Diagnostic, Severity, LEX_ERROR, PARSE_ERROR};
use crate::rules::{Rule, RuleContext, RuleRegistry};

/// Tree and diagnostics of one linted text
#[derive(Debug, Clone)]
pub struct LintResult {
    pub tree: Tree,
    /// Lexer, parser and rule diagnostics in report order
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    pub fn parse_error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.rule == PARSE_ERROR)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Evaluates rules in registration order
///
/// The engine is profile-agnostic; which rules run and with what parameters
/// is decided by the [`StyleProfile`] passed to each call.
#[derive(Clone)]
pub struct RuleEngine {
    registry: RuleRegistry,
}

impl RuleEngine {
    /// Engine over an explicit, ordered rule list
    pub fn new(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            registry: RuleRegistry::from_rules(rules),
        }
    }

    /// Engine over all built-in rules
    pub fn builtin() -> Self {
        Self {
            registry: RuleRegistry::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Sort key rank of a diagnostic source: syntax first, then rules in order
    pub fn rank(&self, rule: &str) -> usize {
        match rule {
            LEX_ERROR | PARSE_ERROR => 0,
            _ => self
                .registry
                .position(rule)
                .map(|idx| idx + 1)
                .unwrap_or(usize::MAX),
        }
    }

    /// Order diagnostics by (line, column, rank); stable for equal keys
    pub fn sort(&self, diagnostics: &mut [Diagnostic]) {
        diagnostics.sort_by_key(|d| (d.line(), d.column(), self.rank(&d.rule)));
    }

    /// Run every enabled rule over `tree`
    ///
    /// A rule with unusable parameters is skipped and reported with a single
    /// error diagnostic carrying its id.
    pub fn evaluate(&self, tree: &Tree, profile: &StyleProfile) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for rule in self.registry.all() {
            let id = rule.id();
            if !profile.is_enabled(id) {
                continue;
            }
            let ctx = RuleContext::new(tree, profile, rule.as_ref());
            match rule.check(&ctx) {
                Ok(found) => {
                    debug!(rule = id, count = found.len(), "rule evaluated");
                    diagnostics.extend(found);
                }
                Err(err) => {
                    warn!(rule = id, error = %err, "skipping rule with invalid configuration");
                    diagnostics.push(Diagnostic::new(
                        id,
                        Severity::Error,
                        format!("invalid configuration: {}", err),
                        Span::empty(Position::start()),
                    ));
                }
            }
        }

        self.sort(&mut diagnostics);
        diagnostics
    }

    /// Tokenize, parse and evaluate `source`
    pub fn lint(&self, source: &str, profile: &StyleProfile) -> LintResult {
        let parse = parse(source);
        let mut diagnostics: Vec<Diagnostic> = parse.errors.iter().map(Diagnostic::from).collect();
        diagnostics.extend(self.evaluate(&parse.tree, profile));
        self.sort(&mut diagnostics);
        LintResult {
            tree: parse.tree,
            diagnostics,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
