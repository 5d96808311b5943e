//! Remove trailing whitespace from lines

use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

/// Flags spaces and tabs before the end of a line, whitespace-only lines included
pub struct TrailingWhitespaceRule;

impl Rule for TrailingWhitespaceRule {
    fn id(&self) -> &'static str {
        "trailing-whitespace"
    }

    fn description(&self) -> &'static str {
        "Remove trailing whitespace at the end of lines"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let source = ctx.source();
        let mut diagnostics = Vec::new();
        let mut offset = 0;

        while offset < source.len() {
            let rest = &source[offset..];
            let line_len = rest.find('\n').unwrap_or(rest.len());
            let mut content = &rest[..line_len];
            if let Some(stripped) = content.strip_suffix('\r') {
                content = stripped;
            }

            let trimmed = content.trim_end_matches([' ', '\t']);
            if trimmed.len() < content.len() {
                let start = offset + trimmed.len();
                let end = offset + content.len();
                let diagnostic = ctx.diagnostic("Trailing whitespace", ctx.span(start, end));
                // Removing the gap after a backslash would turn it into a continuation
                if trimmed.ends_with('\\') {
                    diagnostics.push(diagnostic);
                } else {
                    diagnostics.push(
                        diagnostic.with_edit(Edit::delete(start, end, "Remove trailing whitespace")),
                    );
                }
            }

            offset += line_len + 1;
        }

        Ok(diagnostics)
    }
}
