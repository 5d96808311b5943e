//! Diagnostics and the fixes attached to them

use std::fmt;

use kconfigstyle_core::{Edit, Span, SyntaxError, SyntaxErrorKind};
use serde::{Deserialize, Serialize};

/// Rule id for structural problems found by the parser
pub const PARSE_ERROR: &str = "parse-error";
/// Rule id for unrecognized characters
pub const LEX_ERROR: &str = "lex-error";
/// Rule id for fixes rolled back by the safety check
pub const UNSAFE_FIX: &str = "unsafe-fix";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text replacements that resolve one diagnostic
///
/// A fix is applied as a whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub edits: Vec<Edit>,
}

impl Fix {
    pub fn new(edits: Vec<Edit>) -> Self {
        Self { edits }
    }

    pub fn single(edit: Edit) -> Self {
        Self { edits: vec![edit] }
    }

    pub fn conflicts_with(&self, other: &Fix) -> bool {
        self.edits
            .iter()
            .any(|a| other.edits.iter().any(|b| a.conflicts_with(b)))
    }
}

/// A single finding for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            span,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_edit(self, edit: Edit) -> Self {
        self.with_fix(Fix::single(edit))
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.column
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}:{}: [{}] {} ({})",
            self.line(),
            self.column(),
            self.severity,
            self.message,
            self.rule
        )
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(error: &SyntaxError) -> Self {
        let (rule, severity) = match error.kind {
            SyntaxErrorKind::Lex => (LEX_ERROR, Severity::Warning),
            SyntaxErrorKind::Parse => (PARSE_ERROR, Severity::Error),
        };
        Diagnostic::new(rule, severity, error.message.clone(), error.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kconfigstyle_core::Position;

    fn span_at(line: usize, column: usize) -> Span {
        Span::empty(Position::new(0, line, column))
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::new("trailing-whitespace", Severity::Warning, "Trailing whitespace", span_at(10, 5));
        assert_eq!(
            diag.to_string(),
            "Line 10:5: [warning] Trailing whitespace (trailing-whitespace)"
        );
    }

    #[test]
    fn test_severity_order_and_parse() {
        assert!(Severity::Error > Severity::Warning);
        assert_eq!(Severity::from_str("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::from_str("warn"), Some(Severity::Warning));
        assert_eq!(Severity::from_str("hint"), None);
    }

    #[test]
    fn test_fix_conflicts() {
        let a = Fix::single(Edit::new(0, 4, "x", "a"));
        let b = Fix::new(vec![Edit::new(10, 12, "y", "b"), Edit::new(2, 3, "z", "b")]);
        let c = Fix::single(Edit::new(4, 6, "w", "c"));
        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&c));
    }

    #[test]
    fn test_from_syntax_error() {
        let error = SyntaxError {
            kind: SyntaxErrorKind::Parse,
            message: "missing `endmenu`".to_string(),
            span: span_at(3, 1),
        };
        let diag = Diagnostic::from(&error);
        assert_eq!(diag.rule, PARSE_ERROR);
        assert_eq!(diag.severity, Severity::Error);
        assert!(!diag.is_fixable());
    }
}
