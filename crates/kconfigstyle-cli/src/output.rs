//! Output formatting for kconfigstyle
//!
//! Supports text (colored terminal), JSON and unified diff output formats.

use colored::*;
use serde::Serialize;
use std::path::Path;

use kconfigstyle_fixer::{Diagnostic, FixOutcome, Severity};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// A diagnostic as rendered in JSON output
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticInfo {
    pub rule: String,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub fixable: bool,
}

impl From<&Diagnostic> for DiagnosticInfo {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            rule: diagnostic.rule.clone(),
            severity: diagnostic.severity,
            line: diagnostic.line(),
            column: diagnostic.column(),
            message: diagnostic.message.clone(),
            fixable: diagnostic.is_fixable(),
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticInfo>,
    #[serde(skip_serializing_if = "is_zero")]
    pub fixed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl FileResult {
    pub fn success(path: &Path, diagnostics: &[Diagnostic], fixed: usize) -> Self {
        Self {
            path: path.display().to_string(),
            diagnostics: diagnostics.iter().map(DiagnosticInfo::from).collect(),
            fixed,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            diagnostics: Vec::new(),
            fixed: 0,
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_diagnostics: usize,
    pub files_fixed: usize,
    pub diagnostics: usize,
    pub fixed: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub preset: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    preset: String,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool, preset: &str) -> Self {
        Self {
            format,
            verbose,
            preset: preset.to_string(),
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report the diagnostics of a file that was only checked
    pub fn report_check(&mut self, path: &Path, diagnostics: &[Diagnostic]) {
        self.summary.files_processed += 1;
        self.count_remaining(diagnostics);

        if self.format == OutputFormat::Text {
            if diagnostics.is_empty() {
                if self.verbose {
                    println!("{}: No issues found", path.display());
                }
            } else {
                println!("{}", path.display().to_string().bold());
                print_diagnostics(diagnostics);
                println!();
            }
        }

        self.results.push(FileResult::success(path, diagnostics, 0));
    }

    /// Report a file run through the autofixer
    ///
    /// `written` tells whether the fixed text was saved; otherwise the result
    /// is only a preview.
    pub fn report_fix(&mut self, path: &Path, original: &str, outcome: &FixOutcome, written: bool) {
        self.summary.files_processed += 1;
        self.count_remaining(&outcome.unresolved);
        if outcome.changed && written {
            self.summary.files_fixed += 1;
            self.summary.fixed += outcome.applied.len();
        }

        match self.format {
            OutputFormat::Text => {
                if !outcome.changed && outcome.unresolved.is_empty() {
                    if self.verbose {
                        println!("{}: No issues found", path.display());
                    }
                } else {
                    println!("{}", path.display().to_string().bold());
                    if outcome.changed {
                        let verb = if written { "Fixed" } else { "Would fix" };
                        println!(
                            "  {} {} {} issue(s)",
                            "OK".green(),
                            verb,
                            outcome.applied.len()
                        );
                    }
                    print_diagnostics(&outcome.unresolved);
                    println!();
                }
            }
            OutputFormat::Diff => {
                if outcome.changed {
                    print!("{}", unified_diff(path, original, &outcome.text));
                }
            }
            OutputFormat::Json => {
                // JSON output is handled in finish()
            }
        }

        let fixed = if outcome.changed { outcome.applied.len() } else { 0 };
        self.results
            .push(FileResult::success(path, &outcome.unresolved, fixed));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format != OutputFormat::Json {
            eprintln!("{}: {} - {}", "Error".red(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    fn count_remaining(&mut self, diagnostics: &[Diagnostic]) {
        if !diagnostics.is_empty() {
            self.summary.files_with_diagnostics += 1;
            self.summary.diagnostics += diagnostics.len();
        }
    }

    /// Print final summary/output
    pub fn finish(self, fix_mode: bool) -> serde_json::Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                if fix_mode {
                    println!("  Files fixed: {}", self.summary.files_fixed);
                    println!("  Issues fixed: {}", self.summary.fixed);
                }
                println!("  Issues remaining: {}", self.summary.diagnostics);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                let fixable = self
                    .results
                    .iter()
                    .flat_map(|r| &r.diagnostics)
                    .any(|d| d.fixable);
                if !fix_mode && fixable {
                    println!();
                    println!("{}", "Run with --fix to apply fixes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    preset: self.preset,
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Diff => {
                // Patch-compatible output has no summary
            }
        }
        Ok(())
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow(),
        };
        let marker = if diagnostic.is_fixable() { " *" } else { "" };
        println!(
            "  {}:{}  {}  {}  {}{}",
            diagnostic.line(),
            diagnostic.column(),
            severity,
            diagnostic.message,
            diagnostic.rule.dimmed(),
            marker
        );
    }
}

/// Unified diff (`diff -u` compatible) between old and new content
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();
    let mut out = String::new();

    out.push_str(&format!("--- a/{}\n", path_str));
    out.push_str(&format!("+++ b/{}\n", path_str));

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        out.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            out.push_str(&format!("{}{}", sign, change));
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kconfigstyle_core::{Position, Span};

    fn diagnostic(rule: &str) -> Diagnostic {
        Diagnostic::new(
            rule,
            Severity::Warning,
            "Trailing whitespace",
            Span::empty(Position::new(9, 2, 5)),
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("diff"), Some(OutputFormat::Diff));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_file_result_success() {
        let result = FileResult::success(Path::new("Kconfig"), &[diagnostic("trailing-whitespace")], 0);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 2);
        assert_eq!(result.diagnostics[0].column, 5);
        assert!(!result.diagnostics[0].fixable);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_file_result_error() {
        let result = FileResult::error(Path::new("Kconfig"), "permission denied".to_string());
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.error.as_deref(), Some("permission denied"));
    }

    #[test]
    fn test_json_serialization() {
        let output = JsonOutput {
            version: "0.1.0".to_string(),
            preset: "zephyr".to_string(),
            summary: Summary {
                files_processed: 3,
                files_with_diagnostics: 1,
                diagnostics: 1,
                ..Default::default()
            },
            files: vec![FileResult::success(
                Path::new("Kconfig"),
                &[diagnostic("trailing-whitespace")],
                0,
            )],
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"preset\":\"zephyr\""));
        assert!(json.contains("\"files_processed\":3"));
        assert!(json.contains("\"rule\":\"trailing-whitespace\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(!json.contains("\"fixed\":0,\"error\""));
    }

    #[test]
    fn test_reporter_counts() {
        let mut reporter = Reporter::new(OutputFormat::Json, false, "zephyr");
        reporter.report_check(Path::new("a/Kconfig"), &[]);
        reporter.report_check(Path::new("b/Kconfig"), &[diagnostic("x"), diagnostic("y")]);
        reporter.report_error(Path::new("c/Kconfig"), "not found");

        let summary = reporter.summary();
        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_with_diagnostics, 1);
        assert_eq!(summary.diagnostics, 2);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff(
            Path::new("Kconfig"),
            "config A\n    bool\n",
            "config A\n\tbool\n",
        );
        assert!(diff.starts_with("--- a/Kconfig\n+++ b/Kconfig\n@@"));
        assert!(diff.contains("-    bool\n"));
        assert!(diff.contains("+\tbool\n"));
        assert!(diff.contains(" config A\n"));
    }
}
