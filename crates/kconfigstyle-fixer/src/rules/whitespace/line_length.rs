//! Maximum line length, with wrapping of long dependency expressions

use std::collections::{HashMap, HashSet};

use kconfigstyle_core::syntax::{Keyword, LineKind, TokenKind, Tree};
use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

/// Flags lines wider than `max` columns
///
/// With `wrap`, an expression property is laid out again: joined onto one
/// line when it fits, otherwise split after top-level `&&`/`||` operators
/// into ` \`-continued lines indented one level deeper. Continued lines that
/// would fit on one line are reported too.
pub struct LineLengthRule;

impl Rule for LineLengthRule {
    fn id(&self) -> &'static str {
        "line-length"
    }

    fn description(&self) -> &'static str {
        "Keep lines within the maximum length"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let max = ctx.params.positive("max", 100)?;
        let tab_width = ctx.params.positive("tab_width", 8)?;
        let wrap = ctx.params.bool("wrap", false)?;
        let unit = ctx.layout()?.indent.unit();
        let tree = ctx.tree;
        let source = ctx.source();

        // Physical line number -> logical line containing it
        let mut logical: HashMap<usize, usize> = HashMap::new();
        for idx in 0..tree.lines().len() {
            let first = tree.line_number(idx);
            for number in first..=first + tree.line(idx).continuations {
                logical.insert(number, idx);
            }
        }

        let mut diagnostics = Vec::new();
        let mut relaid: HashSet<usize> = HashSet::new();
        let mut offset = 0;
        let mut number = 1;
        while offset < source.len() {
            let rest = &source[offset..];
            let line_len = rest.find('\n').unwrap_or(rest.len());
            let content = rest[..line_len].trim_end_matches('\r');
            let width = display_width(content, tab_width);

            if width > max {
                let message = format!("Line exceeds {} characters ({})", max, width);
                let mut diagnostic =
                    ctx.diagnostic(message, ctx.span(offset, offset + content.len()));
                if let Some(&idx) = logical.get(&number) {
                    if wrap && relaid.insert(idx) {
                        if let Some(edit) = relayout_edit(tree, idx, &unit, max, tab_width) {
                            diagnostic = diagnostic.with_edit(edit);
                        }
                    }
                }
                diagnostics.push(diagnostic);
            }

            offset += line_len + 1;
            number += 1;
        }

        if wrap {
            for idx in 0..tree.lines().len() {
                if tree.line(idx).continuations == 0 || relaid.contains(&idx) {
                    continue;
                }
                let Some(edit) = relayout_edit(tree, idx, &unit, max, tab_width) else {
                    continue;
                };
                if edit.replacement.contains('\n') {
                    continue;
                }
                let span = tree.line_content_span(idx);
                let message = format!("Continued line fits within {} characters", max);
                diagnostics.push(
                    ctx.diagnostic(message, span)
                        .with_edit(Edit::new(
                            edit.start,
                            edit.end,
                            edit.replacement,
                            "Join continued line",
                        )),
                );
            }
        }

        Ok(diagnostics)
    }
}

/// Columns taken by `text`, tabs advancing to the next multiple of `tab_width`
pub fn display_width(text: &str, tab_width: usize) -> usize {
    text.chars().fold(0, |col, c| match c {
        '\t' => (col / tab_width + 1) * tab_width,
        _ => col + 1,
    })
}

fn is_wrappable(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Depends
            | Keyword::Select
            | Keyword::Imply
            | Keyword::Visible
            | Keyword::Default
            | Keyword::DefBool
            | Keyword::DefTristate
            | Keyword::If
    )
}

/// Pieces of an expression line, each ending after a top-level `&&`/`||`
///
/// Continuations are dropped and whitespace runs collapse to one space.
fn split_pieces(tree: &Tree, idx: usize) -> Option<Vec<String>> {
    let line = tree.line(idx);
    if line.kind != LineKind::Code || line.comment.is_some() {
        return None;
    }
    if !tree.head_keyword(idx).is_some_and(is_wrappable) {
        return None;
    }
    let head = line.head?;
    let end = line.newline.unwrap_or(line.tokens.end);
    let source = tree.source();

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut pending_space = false;
    let mut depth = 0usize;
    for token in &tree.tokens()[head..end] {
        match token.kind {
            TokenKind::Whitespace | TokenKind::LineContinuation => {
                pending_space = true;
                continue;
            }
            TokenKind::Eof => continue,
            _ => {}
        }
        if pending_space && !piece.is_empty() {
            piece.push(' ');
        }
        pending_space = false;

        let text = token.text(source);
        piece.push_str(text);
        if token.kind == TokenKind::Operator {
            match text {
                "(" => depth += 1,
                ")" => depth = depth.saturating_sub(1),
                "&&" | "||" if depth == 0 => pieces.push(std::mem::take(&mut piece)),
                _ => {}
            }
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    Some(pieces)
}

/// Edit laying out logical line `idx` again, if that changes it
///
/// A line without continuations is only ever split, never respaced.
fn relayout_edit(tree: &Tree, idx: usize, unit: &str, max: usize, tab_width: usize) -> Option<Edit> {
    let pieces = split_pieces(tree, idx)?;
    let indent = tree.indent_text(idx);

    let joined = format!("{}{}", indent, pieces.join(" "));
    let text = if display_width(&joined, tab_width) <= max || pieces.len() < 2 {
        joined
    } else {
        let continuation = format!("{}{}", indent, unit);
        let mut out = String::new();
        let mut current = format!("{}{}", indent, pieces[0]);
        for piece in &pieces[1..] {
            let candidate = format!("{} {}", current, piece);
            if display_width(&candidate, tab_width) + 2 <= max {
                current = candidate;
            } else {
                out.push_str(&current);
                out.push_str(" \\\n");
                current = format!("{}{}", continuation, piece);
            }
        }
        out.push_str(&current);
        out
    };

    let content = tree.line_content_span(idx);
    if text == content.text(tree.source()) {
        return None;
    }
    if tree.line(idx).continuations == 0 && !text.contains('\n') {
        return None;
    }
    Some(Edit::new(
        content.start.offset,
        content.end.offset,
        text,
        "Wrap long line",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, RuleSetting};
    use crate::rules::test_support::{apply_all, check_with, profile_with};

    fn check(source: &str, max: i64) -> Vec<Diagnostic> {
        let profile = profile_with(
            Preset::Zephyr,
            "line-length",
            RuleSetting::default().param("max", max),
        );
        check_with(&LineLengthRule, source, &profile)
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("\tab", 8), 10);
        assert_eq!(display_width("ab\tc", 8), 9);
        assert_eq!(display_width("ab\tc", 4), 5);
    }

    #[test]
    fn test_short_lines_ok() {
        assert!(check("config A\n\tbool \"A\"\n", 40).is_empty());
    }

    #[test]
    fn test_long_prompt_not_wrapped() {
        let diagnostics = check("config A\n\tbool \"A very long prompt text\"\n", 20);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Line exceeds 20 characters (38)");
        assert!(!diagnostics[0].is_fixable());
    }

    #[test]
    fn test_wrap_depends() {
        let source = "config A\n\tbool\n\tdepends on FIRST_SYMBOL && SECOND_SYMBOL || THIRD\n";
        let diagnostics = check(source, 40);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\tdepends on FIRST_SYMBOL && \\\n\t\tSECOND_SYMBOL || THIRD\n"
        );
    }

    #[test]
    fn test_parenthesized_operators_kept() {
        let source = "config A\n\tbool\n\tdepends on (LONG_SYMBOL_ONE || LONG_SYMBOL_TWO) && THREE\n";
        let diagnostics = check(source, 40);
        let fixed = apply_all(source, &diagnostics);
        assert_eq!(
            fixed,
            "config A\n\tbool\n\tdepends on (LONG_SYMBOL_ONE || LONG_SYMBOL_TWO) && \\\n\t\tTHREE\n"
        );
    }

    #[test]
    fn test_join_existing_continuations() {
        let source = "config TEST\n\tbool \"Test\"\n\tselect A && \\\n\t\tB && \\\n\t\tC\n";
        let diagnostics = check(source, 100);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line(), 3);
        assert_eq!(
            diagnostics[0].message,
            "Continued line fits within 100 characters"
        );
        assert_eq!(
            apply_all(source, &diagnostics),
            "config TEST\n\tbool \"Test\"\n\tselect A && B && C\n"
        );
    }

    #[test]
    fn test_rewrap_existing_continuations() {
        let source = "config A\n\tbool\n\tdepends on FIRST_SYMBOL && SECOND_SYMBOL && \\\n\t\tTHIRD\n";
        let diagnostics = check(source, 30);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool\n\tdepends on FIRST_SYMBOL && \\\n\t\tSECOND_SYMBOL && \\\n\t\tTHIRD\n"
        );
    }

    #[test]
    fn test_no_join_without_wrap() {
        let profile = profile_with(
            Preset::Zephyr,
            "line-length",
            RuleSetting::default().param("wrap", false),
        );
        let source = "config A\n\tbool\n\tselect A && \\\n\t\tB\n";
        assert!(check_with(&LineLengthRule, source, &profile).is_empty());
    }

    #[test]
    fn test_wrapped_line_not_rewrapped() {
        let source = "config A\n\tbool\n\tdepends on FIRST_SYMBOL_THAT_IS_LONG && \\\n\t\tB\n";
        let diagnostics = check(source, 30);
        assert!(diagnostics.iter().all(|d| !d.is_fixable()));
    }
}
