//! Spacing inside and before `#` comments

use kconfigstyle_core::syntax::{LineKind, TokenKind};
use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

/// Requires a space after the leading `#` of a comment
///
/// `#Foo` becomes `# Foo`; banners such as `####` and a bare `#` are fine.
/// When `inline_spaces` is set, trailing comments must be preceded by exactly
/// that many spaces.
pub struct CommentSpacingRule;

impl Rule for CommentSpacingRule {
    fn id(&self) -> &'static str {
        "comment-spacing"
    }

    fn description(&self) -> &'static str {
        "Put a space after # and normalize spacing before inline comments"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let inline_spaces = ctx.params.optional_usize("inline_spaces")?;
        let tree = ctx.tree;
        let source = ctx.source();
        let tokens = tree.tokens();
        let mut diagnostics = Vec::new();

        for token in tokens {
            if token.kind != TokenKind::Comment {
                continue;
            }
            let text = token.text(source);
            let hashes = text.len() - text.trim_start_matches('#').len();
            let starts_word = text[hashes..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
            if starts_word {
                let at = token.span.start.offset + hashes;
                diagnostics.push(
                    ctx.diagnostic("Missing space after #", ctx.span(token.span.start.offset, at))
                        .with_edit(Edit::insert(at, " ", "Insert space after #")),
                );
            }
        }

        if let Some(spaces) = inline_spaces {
            let wanted = " ".repeat(spaces);
            for line in tree.lines() {
                let (Some(comment), Some(_)) = (line.comment, line.head) else {
                    continue;
                };
                if line.kind != LineKind::Code || comment == 0 {
                    continue;
                }
                let prev = &tokens[comment - 1];
                let (start, end, found) = match prev.kind {
                    TokenKind::Whitespace => {
                        let continued = comment >= 2
                            && tokens[comment - 2].kind == TokenKind::LineContinuation;
                        if continued {
                            continue;
                        }
                        (prev.span.start.offset, prev.span.end.offset, prev.text(source))
                    }
                    TokenKind::LineContinuation | TokenKind::Indent => continue,
                    _ => (prev.span.end.offset, prev.span.end.offset, ""),
                };
                if found == wanted {
                    continue;
                }
                let plural = if spaces == 1 { "space" } else { "spaces" };
                let message = format!("Expected {} {} before inline comment", spaces, plural);
                diagnostics.push(
                    ctx.diagnostic(message, ctx.span(start, end))
                        .with_edit(Edit::new(start, end, wanted.clone(), "Fix inline comment spacing")),
                );
            }
        }

        diagnostics.sort_by_key(|d| d.span.start.offset);
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, RuleSetting};
    use crate::rules::test_support::{apply_all, check_preset, check_with, profile_with};

    fn zephyr(source: &str) -> Vec<Diagnostic> {
        check_preset(&CommentSpacingRule, source, Preset::Zephyr)
    }

    #[test]
    fn test_missing_space() {
        let source = "#Comment\nconfig A\n\tbool # fine\n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Missing space after #");
        assert_eq!(
            apply_all(source, &diagnostics),
            "# Comment\nconfig A\n\tbool # fine\n"
        );
    }

    #[test]
    fn test_banners_and_bare_hash() {
        let source = "#\n##########\n## Section\n#-- divider\n";
        assert!(zephyr(source).is_empty());
    }

    #[test]
    fn test_double_hash_word() {
        let source = "##Section\n";
        let diagnostics = zephyr(source);
        assert_eq!(apply_all(source, &diagnostics), "## Section\n");
    }

    #[test]
    fn test_inline_spacing() {
        let profile = profile_with(
            Preset::Zephyr,
            "comment-spacing",
            RuleSetting::default().param("inline_spaces", 1),
        );
        let source = "config A\n\tbool    # note\n\tdefault y# other\n";
        let diagnostics = check_with(&CommentSpacingRule, source, &profile);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool # note\n\tdefault y # other\n"
        );
    }
}
