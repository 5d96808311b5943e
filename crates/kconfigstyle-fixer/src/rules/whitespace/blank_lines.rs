//! Blank line runs and separation between top-level entries

use kconfigstyle_core::syntax::{BlockKind, LineKind, NodeId, NodeKind, Tree};
use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

/// Limits consecutive blank lines and optionally separates top-level entries
///
/// Parameters: `max_consecutive` (default 1), `trailing` (flag blank lines at
/// end of file, default true), `separate_entries` (default false).
pub struct BlankLinesRule;

impl Rule for BlankLinesRule {
    fn id(&self) -> &'static str {
        "blank-lines"
    }

    fn description(&self) -> &'static str {
        "Remove extra blank lines and separate top-level entries"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let max = ctx.params.usize("max_consecutive", 1)?;
        let trailing = ctx.params.bool("trailing", true)?;
        let separate = ctx.params.bool("separate_entries", false)?;
        let tree = ctx.tree;
        let lines = tree.lines();
        let mut diagnostics = Vec::new();

        let mut idx = 0;
        while idx < lines.len() {
            if lines[idx].kind != LineKind::Blank {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < lines.len() && lines[idx].kind == LineKind::Blank {
                idx += 1;
            }
            let end = idx;

            if end == lines.len() && trailing {
                let from = tree.line_span(start).start.offset;
                let to = tree.line_span(end - 1).end.offset;
                diagnostics.push(
                    ctx.diagnostic("Blank lines at end of file", ctx.span(from, to))
                        .with_edit(Edit::delete(from, to, "Remove blank lines at end of file")),
                );
            } else if end - start > max {
                let from = tree.line_span(start + max).start.offset;
                let to = tree.line_span(end - 1).end.offset;
                diagnostics.push(
                    ctx.diagnostic("Multiple consecutive empty lines", ctx.span(from, to))
                        .with_edit(Edit::delete(from, to, "Remove extra blank lines")),
                );
            }
        }

        if separate {
            let children = tree.children(tree.root());
            for pair in children.windows(2) {
                if is_separated_item(tree, pair[0]) && is_separated_item(tree, pair[1]) {
                    let at = tree.span(pair[1]).start.offset;
                    diagnostics.push(
                        ctx.diagnostic("Missing blank line between entries", ctx.span(at, at))
                            .with_edit(Edit::insert(at, "\n", "Insert blank line")),
                    );
                }
            }
        }

        Ok(diagnostics)
    }
}

fn is_separated_item(tree: &Tree, id: NodeId) -> bool {
    match &tree.node(id).kind {
        NodeKind::Entry(_) => true,
        NodeKind::Block(block) => block.kind != BlockKind::File,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, RuleSetting};
    use crate::rules::test_support::{apply_all, check_preset, check_with, profile_with};

    fn zephyr(source: &str) -> Vec<Diagnostic> {
        check_preset(&BlankLinesRule, source, Preset::Zephyr)
    }

    #[test]
    fn test_single_blank_line_ok() {
        assert!(zephyr("config A\n\tbool\n\nconfig B\n\tbool\n").is_empty());
    }

    #[test]
    fn test_double_blank_collapsed() {
        let source = "config A\n\tbool\n\n\nconfig B\n\tbool\n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Multiple consecutive empty lines");
        assert_eq!(diagnostics[0].line(), 4);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\nconfig B\n\tbool\n"
        );
    }

    #[test]
    fn test_one_diagnostic_per_run() {
        let source = "config A\n\tbool\n\n\n\n\nconfig B\n\tbool\n";
        let diagnostics = zephyr(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\nconfig B\n\tbool\n"
        );
    }

    #[test]
    fn test_trailing_blank_lines() {
        let source = "config A\n\tbool\n\n  \n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Blank lines at end of file");
        assert_eq!(apply_all(source, &diagnostics), "config A\n\tbool\n");
    }

    #[test]
    fn test_missing_separation() {
        let source = "config A\n\tbool\nconfig B\n\tbool\n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Missing blank line between entries");
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\nconfig B\n\tbool\n"
        );
    }

    #[test]
    fn test_separation_only_at_top_level() {
        let source = "menu \"M\"\nconfig A\n\tbool\nconfig B\n\tbool\nendmenu\n";
        assert!(zephyr(source).is_empty());
    }

    #[test]
    fn test_separation_off_for_idf() {
        let diagnostics = check_preset(
            &BlankLinesRule,
            "config A\n\tbool\nconfig B\n\tbool\n",
            Preset::EspIdf,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_custom_max() {
        let profile = profile_with(
            Preset::Zephyr,
            "blank-lines",
            RuleSetting::default().param("max_consecutive", 2),
        );
        let diagnostics = check_with(
            &BlankLinesRule,
            "config A\n\tbool\n\n\nconfig B\n\tbool\n",
            &profile,
        );
        assert!(diagnostics.is_empty());
    }
}
