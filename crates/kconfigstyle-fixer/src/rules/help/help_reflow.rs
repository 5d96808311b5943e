//! Re-fill plain help paragraphs to a target width

use std::ops::Range;

use kconfigstyle_core::syntax::LineKind;
use kconfigstyle_core::{Edit, Tree};

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::whitespace::display_width;
use crate::rules::{LineMap, Rule, RuleContext};

/// Greedily re-wraps help paragraphs to `width` columns
///
/// Only paragraphs whose lines all share the expected help indent are
/// touched. Bulleted and extra-indented paragraphs are left alone, and a
/// block is skipped until `help-indent` has settled its indentation.
pub struct HelpReflowRule;

impl Rule for HelpReflowRule {
    fn id(&self) -> &'static str {
        "help-reflow"
    }

    fn description(&self) -> &'static str {
        "Re-wrap help text paragraphs to a fixed width"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let width = ctx.params.positive("width", 80)?;
        let tab_width = ctx.params.positive("tab_width", 8)?;
        let layout = ctx.layout()?;
        let tree = ctx.tree;
        let source = ctx.source();
        let map = LineMap::new(tree);
        let mut diagnostics = Vec::new();

        for region in map.help_regions() {
            let indent = layout.help_indent(region.depth);
            let first = region
                .lines
                .clone()
                .find(|&l| tree.line(l).kind == LineKind::Help);
            if first.map(|l| tree.indent_text(l)) != Some(indent.as_str()) {
                continue;
            }

            for paragraph in paragraphs(tree, region.lines.clone()) {
                let texts: Vec<&str> = paragraph
                    .iter()
                    .map(|&l| tree.line_content_span(l).text(source))
                    .collect();
                let plain = texts.iter().all(|text| {
                    let body = text.strip_prefix(indent.as_str()).unwrap_or("");
                    !body.is_empty()
                        && !body.starts_with([' ', '\t'])
                        && !body.starts_with("- ")
                        && !body.starts_with("* ")
                });
                if !plain {
                    continue;
                }

                let start = tree.line_span(paragraph[0]).start.offset;
                let end = tree.line_content_span(paragraph[paragraph.len() - 1]).end.offset;
                let original = &source[start..end];
                let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
                let filled = refill(&texts, &indent, width, tab_width).join(newline);
                if filled == original {
                    continue;
                }

                let message = format!("Help paragraph should be wrapped at {} columns", width);
                diagnostics.push(
                    ctx.diagnostic(message, ctx.span(start, start))
                        .with_edit(Edit::new(start, end, filled, "Re-wrap help paragraph")),
                );
            }
        }

        Ok(diagnostics)
    }
}

/// Runs of consecutive help text lines
fn paragraphs(tree: &Tree, lines: Range<usize>) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = Vec::new();
    let mut current = Vec::new();
    for line in lines {
        if tree.line(line).kind == LineKind::Help {
            current.push(line);
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn refill(texts: &[&str], indent: &str, width: usize, tab_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in texts.iter().flat_map(|t| t.split_whitespace()) {
        if current.is_empty() {
            current = format!("{}{}", indent, word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if display_width(&candidate, tab_width) <= width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, format!("{}{}", indent, word)));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
