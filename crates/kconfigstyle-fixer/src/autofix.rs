//! Autofixer: applies non-conflicting fixes in passes and verifies each pass
//!
//! A pass picks fixes in rule registration order, skipping any fix that
//! touches text an accepted fix already claims. The accepted edits are spliced
//! into the text in one go and the result is parsed again. The pass is kept
//! only if it introduces no parse errors and leaves the structural outline
//! untouched. Deferred fixes are recomputed against the new text and retried
//! in the next pass.

use std::collections::HashSet;

use kconfigstyle_core::syntax::OutlineItem;
use kconfigstyle_core::{apply_edits, parse, Edit, Tree};
use tracing::{debug, warn};

use crate::config::StyleProfile;
use crate::diagnostic::{Diagnostic, Severity, UNSAFE_FIX};
use crate::engine::{LintResult, RuleEngine};

/// Result of fixing one text
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub text: String,
    pub changed: bool,
    /// Diagnostics whose fixes made it into `text`
    pub applied: Vec<Diagnostic>,
    /// Diagnostics still present in `text`, including `unsafe-fix` reports
    pub unresolved: Vec<Diagnostic>,
    pub passes: usize,
}

/// Identity of a fix that survives offset shifts from other fixes
///
/// Fixes that were rolled back are not retried for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FixKey {
    rule: String,
    message: String,
    edits: Vec<(String, String)>,
}

impl FixKey {
    fn new(diagnostic: &Diagnostic, text: &str) -> Self {
        let edits = diagnostic
            .fix
            .iter()
            .flat_map(|fix| fix.edits.iter())
            .map(|edit| {
                let covered = text.get(edit.start..edit.end).unwrap_or_default();
                (covered.to_string(), edit.replacement.clone())
            })
            .collect();
        Self {
            rule: diagnostic.rule.clone(),
            message: diagnostic.message.clone(),
            edits,
        }
    }
}

/// Why a candidate text was rejected
enum Rejection {
    Splice(String),
    NewParseErrors,
    OutlineChanged,
}

impl Rejection {
    fn describe(&self) -> String {
        match self {
            Rejection::Splice(err) => format!("edits could not be applied ({})", err),
            Rejection::NewParseErrors => "result would not parse".to_string(),
            Rejection::OutlineChanged => "result would change the file structure".to_string(),
        }
    }
}

pub struct Autofixer<'a> {
    engine: &'a RuleEngine,
    profile: &'a StyleProfile,
    max_passes: usize,
}

impl<'a> Autofixer<'a> {
    pub const DEFAULT_MAX_PASSES: usize = 8;

    pub fn new(engine: &'a RuleEngine, profile: &'a StyleProfile) -> Self {
        Self {
            engine,
            profile,
            max_passes: Self::DEFAULT_MAX_PASSES,
        }
    }

    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Fix `text`, whose parse is `tree` and whose lint result is `diagnostics`
    pub fn fix(&self, text: &str, tree: &Tree, diagnostics: &[Diagnostic]) -> FixOutcome {
        let baseline = Baseline {
            outline: tree.outline(),
            parse_errors: parse(text).parse_errors().count(),
        };

        let mut current = text.to_string();
        let mut remaining = diagnostics.to_vec();
        let mut applied = Vec::new();
        let mut blocked: HashSet<FixKey> = HashSet::new();
        let mut reports = Vec::new();
        let mut passes = 0;

        while passes < self.max_passes {
            let selected = self.select(&remaining, &blocked, &current);
            if selected.is_empty() {
                break;
            }
            passes += 1;

            let (kept, lint) = match self.try_apply(&current, &selected, &baseline) {
                Ok(lint) => (selected, Some(lint)),
                Err(rejection) => {
                    warn!(pass = passes, fixes = selected.len(), reason = %rejection.describe(), "fix pass rolled back");
                    self.salvage(&current, selected, &baseline, &mut blocked, &mut reports)
                }
            };
            let Some(lint) = lint else {
                continue;
            };

            debug!(pass = passes, applied = kept.len(), remaining = lint.diagnostics.len(), "fix pass applied");
            if lint.tree.source() == current {
                break;
            }
            current = lint.tree.source().to_string();
            remaining = lint.diagnostics;
            applied.extend(kept);
        }

        let mut unresolved = remaining;
        unresolved.extend(reports);
        self.engine.sort(&mut unresolved);

        FixOutcome {
            changed: current != text,
            text: current,
            applied,
            unresolved,
            passes,
        }
    }

    /// Fixable diagnostics that do not overlap, highest priority first
    fn select(&self, diagnostics: &[Diagnostic], blocked: &HashSet<FixKey>, text: &str) -> Vec<Diagnostic> {
        let mut candidates: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.fix.is_some())
            .filter(|d| !blocked.contains(&FixKey::new(d, text)))
            .collect();
        candidates.sort_by_key(|d| (self.engine.rank(&d.rule), first_offset(d)));

        let mut accepted: Vec<Diagnostic> = Vec::new();
        for candidate in candidates {
            let Some(fix) = &candidate.fix else {
                continue;
            };
            let conflicts = accepted
                .iter()
                .filter_map(|a| a.fix.as_ref())
                .any(|other| other.conflicts_with(fix));
            if !conflicts {
                accepted.push(candidate.clone());
            }
        }
        accepted
    }

    /// Splice the fixes of `selected` into `text` and verify the result
    fn try_apply(
        &self,
        text: &str,
        selected: &[Diagnostic],
        baseline: &Baseline,
    ) -> Result<LintResult, Rejection> {
        let edits: Vec<Edit> = selected
            .iter()
            .filter_map(|d| d.fix.as_ref())
            .flat_map(|fix| fix.edits.iter().cloned())
            .collect();
        let candidate = apply_edits(text, &edits).map_err(|e| Rejection::Splice(e.to_string()))?;

        let lint = self.engine.lint(&candidate, self.profile);
        if lint.parse_error_count() > baseline.parse_errors {
            return Err(Rejection::NewParseErrors);
        }
        if lint.tree.outline() != baseline.outline {
            return Err(Rejection::OutlineChanged);
        }
        Ok(lint)
    }

    /// Retry a rejected pass one fix at a time, keeping the ones that verify
    fn salvage(
        &self,
        text: &str,
        selected: Vec<Diagnostic>,
        baseline: &Baseline,
        blocked: &mut HashSet<FixKey>,
        reports: &mut Vec<Diagnostic>,
    ) -> (Vec<Diagnostic>, Option<LintResult>) {
        let mut kept: Vec<Diagnostic> = Vec::new();
        let mut lint = None;

        for diagnostic in selected {
            kept.push(diagnostic);
            match self.try_apply(text, &kept, baseline) {
                Ok(result) => lint = Some(result),
                Err(rejection) => {
                    let Some(diagnostic) = kept.pop() else {
                        continue;
                    };
                    warn!(
                        rule = %diagnostic.rule,
                        line = diagnostic.line(),
                        reason = %rejection.describe(),
                        "discarding unsafe fix"
                    );
                    if !blocked.insert(FixKey::new(&diagnostic, text)) {
                        continue;
                    }
                    reports.push(Diagnostic::new(
                        UNSAFE_FIX,
                        Severity::Error,
                        format!("Fix for `{}` discarded: {}", diagnostic.rule, rejection.describe()),
                        diagnostic.span,
                    ));
                }
            }
        }

        (kept, lint)
    }
}

struct Baseline {
    outline: Vec<OutlineItem>,
    parse_errors: usize,
}

fn first_offset(diagnostic: &Diagnostic) -> usize {
    diagnostic
        .fix
        .as_ref()
        .and_then(|fix| fix.edits.iter().map(|e| e.start).min())
        .unwrap_or(diagnostic.span.start.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::diagnostic::Fix;
    use crate::rules::{Rule, RuleContext};
    use crate::RuleConfigError;
    use std::sync::Arc;

    fn fix_with(preset: Preset, source: &str) -> FixOutcome {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(preset);
        let lint = engine.lint(source, &profile);
        Autofixer::new(&engine, &profile).fix(source, &lint.tree, &lint.diagnostics)
    }

    #[test]
    fn test_clean_input_unchanged() {
        let source = "config FOO\n\tbool \"Foo\"\n\tdefault y\n";
        let outcome = fix_with(Preset::Zephyr, source);
        assert!(!outcome.changed);
        assert_eq!(outcome.text, source);
        assert_eq!(outcome.passes, 0);
        assert!(outcome.applied.is_empty());
    }

    #[test]
    fn test_fixes_indentation_and_whitespace() {
        let source = "config FOO  \n    bool \"Foo\"\ndefault y\n";
        let outcome = fix_with(Preset::Zephyr, source);
        assert_eq!(outcome.text, "config FOO\n\tbool \"Foo\"\n\tdefault y\n");
        assert!(outcome.changed);
        assert!(outcome.unresolved.is_empty(), "{:?}", outcome.unresolved);
        assert_eq!(outcome.applied.len(), 3);
    }

    #[test]
    fn test_fix_is_idempotent() {
        let source = "menu \"Net\"\n\n\n  config NET\n  bool \"net\"\n  help\n   Networking.\nendmenu\n\n";
        let first = fix_with(Preset::EspIdf, source);
        let second = fix_with(Preset::EspIdf, &first.text);
        assert_eq!(first.text, second.text);
        assert!(!second.changed);
    }

    #[test]
    fn test_unfixable_kept_as_unresolved() {
        let outcome = fix_with(Preset::Zephyr, "config foo\n\tbool\n");
        assert!(!outcome.changed);
        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].rule, "symbol-naming");
    }

    /// Rewrites the first header keyword, which changes the outline
    struct BreakStructure;

    impl Rule for BreakStructure {
        fn id(&self) -> &'static str {
            "break-structure"
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
            let source = ctx.source();
            let Some(at) = source.find("config") else {
                return Ok(Vec::new());
            };
            let span = ctx.span(at, at + 6);
            Ok(vec![ctx
                .diagnostic("rename", span)
                .with_fix(Fix::single(Edit::new(at, at + 6, "comment", "rename")))])
        }
    }

    #[test]
    fn test_unsafe_fix_rolled_back() {
        let engine = RuleEngine::new(vec![
            Arc::new(crate::rules::whitespace::TrailingWhitespaceRule),
            Arc::new(BreakStructure),
        ]);
        let profile = StyleProfile::new("test")
            .with_rule("trailing-whitespace", Default::default())
            .with_rule("break-structure", Default::default());
        let source = "config A \n\tbool\n";
        let lint = engine.lint(source, &profile);
        let outcome = Autofixer::new(&engine, &profile).fix(source, &lint.tree, &lint.diagnostics);

        assert_eq!(outcome.text, "config A\n\tbool\n");
        let rules: Vec<&str> = outcome.unresolved.iter().map(|d| d.rule.as_str()).collect();
        assert!(rules.contains(&UNSAFE_FIX));
        assert!(rules.contains(&"break-structure"));
        assert_eq!(
            outcome.unresolved.iter().filter(|d| d.rule == UNSAFE_FIX).count(),
            1
        );
    }

    #[test]
    fn test_max_passes_bound() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let source = "config A \n    bool\n";
        let lint = engine.lint(source, &profile);
        let outcome = Autofixer::new(&engine, &profile)
            .max_passes(1)
            .fix(source, &lint.tree, &lint.diagnostics);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.text, "config A\n\tbool\n");
    }
}
