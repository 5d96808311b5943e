//! Parallel batch processing of many files
//!
//! Files are independent units of work. The runner lints (and optionally
//! fixes) them on a dedicated rayon pool and returns one report per input in
//! input order. It never writes files; callers decide what to do with fixed
//! text.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::autofix::{Autofixer, FixOutcome};
use crate::config::StyleProfile;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::RuleEngine;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Check,
    Fix,
}

#[derive(Debug, Clone)]
pub enum FileOutcome {
    Checked {
        diagnostics: Vec<Diagnostic>,
    },
    Fixed {
        original: String,
        outcome: FixOutcome,
    },
    ReadError(String),
    Cancelled,
}

impl FileOutcome {
    /// Diagnostics left in the file after this run
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            FileOutcome::Checked { diagnostics } => diagnostics,
            FileOutcome::Fixed { outcome, .. } => &outcome.unresolved,
            FileOutcome::ReadError(_) | FileOutcome::Cancelled => &[],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_read_error(&self) -> bool {
        matches!(self, FileOutcome::ReadError(_))
    }

    /// Fixed text, if the run changed the file
    pub fn fixed_text(&self) -> Option<&str> {
        match self {
            FileOutcome::Fixed { outcome, .. } if outcome.changed => Some(&outcome.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileReport<I> {
    pub input: I,
    pub outcome: FileOutcome,
}

pub struct BatchRunner<'a> {
    engine: &'a RuleEngine,
    profile: &'a StyleProfile,
    jobs: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a RuleEngine, profile: &'a StyleProfile) -> Self {
        Self {
            engine,
            profile,
            jobs: 0,
            cancel: None,
        }
    }

    /// Worker count; 0 lets rayon pick one per core
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Files not yet started when `flag` is set are reported as cancelled
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Process `inputs`, loading each one with `read`
    pub fn run<I, F>(
        &self,
        inputs: Vec<I>,
        read: F,
        mode: RunMode,
    ) -> Result<Vec<FileReport<I>>, RunnerError>
    where
        I: Send,
        F: Fn(&I) -> std::io::Result<String> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        debug!(files = inputs.len(), threads = pool.current_num_threads(), ?mode, "starting batch");

        let reports = pool.install(|| {
            inputs
                .into_par_iter()
                .map(|input| {
                    let outcome = self.process(&input, &read, mode);
                    FileReport { input, outcome }
                })
                .collect()
        });
        Ok(reports)
    }

    fn process<I, F>(&self, input: &I, read: &F, mode: RunMode) -> FileOutcome
    where
        F: Fn(&I) -> std::io::Result<String>,
    {
        if self.is_cancelled() {
            return FileOutcome::Cancelled;
        }

        let source = match read(input) {
            Ok(source) => source,
            Err(err) => return FileOutcome::ReadError(err.to_string()),
        };

        let lint = self.engine.lint(&source, self.profile);
        match mode {
            RunMode::Check => FileOutcome::Checked {
                diagnostics: lint.diagnostics,
            },
            RunMode::Fix => {
                let outcome = Autofixer::new(self.engine, self.profile).fix(
                    &source,
                    &lint.tree,
                    &lint.diagnostics,
                );
                FileOutcome::Fixed {
                    original: source,
                    outcome,
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use std::io;

    fn sources() -> Vec<(&'static str, &'static str)> {
        vec![
            ("a", "config A\n\tbool\n"),
            ("b", "config B \n\tbool\n"),
            ("c", "config c\n    bool\n"),
            ("d", "config D\n\tbool\n\n\n\nconfig E\n\tbool\n"),
        ]
    }

    fn read(input: &(&'static str, &'static str)) -> io::Result<String> {
        Ok(input.1.to_string())
    }

    #[test]
    fn test_preserves_input_order() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let reports = BatchRunner::new(&engine, &profile)
            .jobs(4)
            .run(sources(), read, RunMode::Check)
            .unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.input.0).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert!(reports[0].outcome.diagnostics().is_empty());
        assert_eq!(reports[1].outcome.diagnostics().len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let one = BatchRunner::new(&engine, &profile)
            .jobs(1)
            .run(sources(), read, RunMode::Fix)
            .unwrap();
        let many = BatchRunner::new(&engine, &profile)
            .jobs(4)
            .run(sources(), read, RunMode::Fix)
            .unwrap();

        for (a, b) in one.iter().zip(&many) {
            assert_eq!(a.outcome.fixed_text(), b.outcome.fixed_text());
            assert_eq!(a.outcome.diagnostics(), b.outcome.diagnostics());
        }
    }

    #[test]
    fn test_fix_mode() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let reports = BatchRunner::new(&engine, &profile)
            .run(sources(), read, RunMode::Fix)
            .unwrap();

        assert_eq!(reports[0].outcome.fixed_text(), None);
        assert_eq!(reports[1].outcome.fixed_text(), Some("config B\n\tbool\n"));
        assert_eq!(
            reports[3].outcome.fixed_text(),
            Some("config D\n\tbool\n\nconfig E\n\tbool\n")
        );
        // lowercase name is not fixable
        assert_eq!(reports[2].outcome.diagnostics().len(), 1);
    }

    #[test]
    fn test_read_errors_are_per_file() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let reports = BatchRunner::new(&engine, &profile)
            .run(
                vec!["ok", "missing"],
                |name: &&str| {
                    if *name == "missing" {
                        Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
                    } else {
                        Ok("config A\n\tbool\n".to_string())
                    }
                },
                RunMode::Check,
            )
            .unwrap();

        assert!(!reports[0].outcome.is_read_error());
        assert!(reports[1].outcome.is_read_error());
    }

    #[test]
    fn test_cancelled() {
        let engine = RuleEngine::builtin();
        let profile = StyleProfile::preset(Preset::Zephyr);
        let flag = Arc::new(AtomicBool::new(true));
        let reports = BatchRunner::new(&engine, &profile)
            .cancel_flag(flag)
            .run(sources(), read, RunMode::Check)
            .unwrap();
        assert!(reports
            .iter()
            .all(|r| matches!(r.outcome, FileOutcome::Cancelled)));
    }
}
