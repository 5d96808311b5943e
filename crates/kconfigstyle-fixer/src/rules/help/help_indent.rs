//! Indentation of help text relative to its entry

use kconfigstyle_core::syntax::{indent_width, LineKind};
use kconfigstyle_core::Edit;

use crate::config::{describe, RuleConfigError};
use crate::diagnostic::{Diagnostic, Fix};
use crate::rules::{indent_end, LineMap, Rule, RuleContext};

/// Moves help text to the property indent plus `help_extra` spaces
///
/// Lines indented deeper than the first help line keep their extra
/// indentation, so lists and code samples survive.
pub struct HelpIndentRule;

impl Rule for HelpIndentRule {
    fn id(&self) -> &'static str {
        "help-indent"
    }

    fn description(&self) -> &'static str {
        "Indent help text consistently below its entry"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let layout = ctx.layout()?;
        let tree = ctx.tree;
        let map = LineMap::new(tree);
        let mut diagnostics = Vec::new();

        for region in map.help_regions() {
            let expected = layout.help_indent(region.depth);
            let text_lines: Vec<usize> = region
                .lines
                .clone()
                .filter(|&l| tree.line(l).kind == LineKind::Help)
                .collect();
            let Some(&first) = text_lines.first() else {
                continue;
            };
            let baseline = indent_width(tree.indent_text(first));

            let mut edits = Vec::new();
            let mut first_bad = None;
            for &line in &text_lines {
                let actual = tree.indent_text(line);
                let extra = indent_width(actual).saturating_sub(baseline);
                let wanted = format!("{}{}", expected, " ".repeat(extra));
                if actual == wanted {
                    continue;
                }
                let start = tree.line_span(line).start.offset;
                let end = indent_end(tree, line);
                first_bad.get_or_insert((start, end));
                edits.push(Edit::new(start, end, wanted, "Fix help text indentation"));
            }

            if let Some((start, end)) = first_bad {
                let message = format!("Help text should be indented with {}", describe(&expected));
                diagnostics.push(
                    ctx.diagnostic(message, ctx.span(start, end))
                        .with_fix(Fix::new(edits)),
                );
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::rules::test_support::{apply_all, check_preset};

    fn zephyr(source: &str) -> Vec<Diagnostic> {
        check_preset(&HelpIndentRule, source, Preset::Zephyr)
    }

    #[test]
    fn test_correct_help() {
        let source = "config A\n\tbool\n\thelp\n\t  Some text.\n\n\t  More text.\n";
        assert!(zephyr(source).is_empty());
    }

    #[test]
    fn test_wrong_help_indent() {
        let source = "config A\n\tbool\n\thelp\n\t Some text.\n\t More text.\n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Help text should be indented with 1 tab and 2 spaces"
        );
        assert_eq!(diagnostics[0].line(), 4);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\thelp\n\t  Some text.\n\t  More text.\n"
        );
    }

    #[test]
    fn test_relative_indent_preserved() {
        let source = "config A\n\tbool\n\thelp\n    Options:\n      - one\n";
        let diagnostics = zephyr(source);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\thelp\n\t  Options:\n\t    - one\n"
        );
    }

    #[test]
    fn test_nested_idf_help() {
        let source = "menu \"M\"\n    config A\n        bool\n        help\n          Text.\nendmenu\n";
        let diagnostics = check_preset(&HelpIndentRule, source, Preset::EspIdf);
        let expected = format!(
            "menu \"M\"\n    config A\n        bool\n        help\n{}Text.\nendmenu\n",
            " ".repeat(12)
        );
        assert_eq!(apply_all(source, &diagnostics), expected);
    }
}
