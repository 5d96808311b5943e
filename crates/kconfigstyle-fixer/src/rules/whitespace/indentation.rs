//! Indentation of structural and property lines

use std::ops::Range;

use kconfigstyle_core::syntax::{TokenKind, Tree};
use kconfigstyle_core::Edit;

use crate::config::{describe, IndentStyle, RuleConfigError};
use crate::diagnostic::Diagnostic;
use crate::rules::{indent_end, LineMap, LineRole, Rule, RuleContext};

/// Checks the indentation of every entry, block, directive and property line
///
/// Lines are expected at `nested ? depth : 0` levels, properties one level
/// deeper. Continuation lines sit one level below the line they continue.
/// Help text is left to `help-indent`.
pub struct IndentationRule;

impl Rule for IndentationRule {
    fn id(&self) -> &'static str {
        "indentation"
    }

    fn description(&self) -> &'static str {
        "Indent entries and properties consistently with tabs or spaces"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let layout = ctx.layout()?;
        let tree = ctx.tree;
        let map = LineMap::new(tree);
        let mut diagnostics = Vec::new();

        for (line, role) in map.roles() {
            let (expected, alternative) = match role {
                LineRole::Item { depth } => (layout.item_indent(depth), None),
                LineRole::Property { depth } => (layout.property_indent(depth), None),
                LineRole::Comment { depth } => {
                    (layout.item_indent(depth), Some(layout.property_indent(depth)))
                }
                LineRole::HelpText { .. } | LineRole::Skip => continue,
            };

            let actual = tree.indent_text(line);
            if actual != expected && alternative.as_deref() != Some(actual) {
                let message = mismatch_message(layout.indent, actual, &expected);
                let start = tree.line_span(line).start.offset;
                let end = indent_end(tree, line);
                diagnostics.push(
                    ctx.diagnostic(message, ctx.span(start, end))
                        .with_edit(Edit::new(start, end, expected.clone(), "Fix indentation")),
                );
            }

            let continued = format!("{}{}", expected, layout.indent.unit());
            for range in continuation_indents(tree, line) {
                let actual = &ctx.source()[range.clone()];
                if actual == continued {
                    continue;
                }
                let message = mismatch_message(layout.indent, actual, &continued);
                diagnostics.push(
                    ctx.diagnostic(message, ctx.span(range.start, range.end))
                        .with_edit(Edit::new(
                            range.start,
                            range.end,
                            continued.clone(),
                            "Fix continuation indentation",
                        )),
                );
            }
        }

        Ok(diagnostics)
    }
}

/// Byte ranges of the indentation of each continuation line of `line`
///
/// Continuation lines holding only whitespace are skipped.
fn continuation_indents(tree: &Tree, line: usize) -> Vec<Range<usize>> {
    let tokens = tree.tokens();
    let range = tree.line(line).tokens.clone();
    let kind_at = |t: usize| range.contains(&t).then(|| tokens[t].kind);

    range
        .clone()
        .filter(|&t| tokens[t].kind == TokenKind::LineContinuation)
        .filter_map(|t| {
            let start = tokens[t].span.end.offset;
            match kind_at(t + 1) {
                Some(TokenKind::Whitespace) => match kind_at(t + 2) {
                    None | Some(TokenKind::Newline) | Some(TokenKind::Eof) => None,
                    Some(_) => Some(start..tokens[t + 1].span.end.offset),
                },
                None
                | Some(TokenKind::Newline)
                | Some(TokenKind::Eof)
                | Some(TokenKind::LineContinuation) => None,
                Some(_) => Some(start..start),
            }
        })
        .collect()
}

fn mismatch_message(style: IndentStyle, actual: &str, expected: &str) -> String {
    let has_tabs = actual.contains('\t');
    let has_spaces = actual.contains(' ');

    if has_tabs && has_spaces {
        return "Mixed tabs and spaces in indentation".to_string();
    }
    match style {
        IndentStyle::Tabs if has_spaces => return "Use tabs for indentation".to_string(),
        IndentStyle::Spaces(_) if has_tabs => return "Use spaces for indentation".to_string(),
        IndentStyle::Spaces(width) if actual.len() % width != 0 => {
            return format!("Indentation should be a multiple of {} spaces", width);
        }
        _ => {}
    }
    format!(
        "Expected indentation of {}, found {}",
        describe(expected),
        describe(actual)
    )
}
