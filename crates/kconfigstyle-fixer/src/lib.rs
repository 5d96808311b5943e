//! kconfigstyle-fixer: Kconfig style rules and autofixer
//!
//! This crate evaluates formatting rules over a parsed Kconfig tree and
//! rewrites files to satisfy them.
//!
//! # Features
//!
//! - Zephyr and ESP-IDF style presets
//! - Independently toggleable, parameterized rules
//! - Deterministic diagnostics ordered by position, then rule registration
//! - Conflict-free, idempotent autofix with a re-parse safety check
//! - Parallel batch processing that preserves input order
//!
//! # Example
//!
//! ```ignore
//! use kconfigstyle_fixer::{Autofixer, Preset, RuleEngine, StyleProfile};
//!
//! let profile = StyleProfile::preset(Preset::Zephyr);
//! let engine = RuleEngine::builtin();
//! let lint = engine.lint(source, &profile);
//! let outcome = Autofixer::new(&engine, &profile).fix(source, &lint.tree, &lint.diagnostics);
//! ```

pub mod autofix;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod rules;
pub mod runner;

pub use autofix::{Autofixer, FixOutcome};
pub use config::{ConfigValue, IndentStyle, Layout, Preset, RuleConfigError, RuleParams, RuleSetting, StyleProfile};
pub use diagnostic::{Diagnostic, Fix, Severity};
pub use engine::{LintResult, RuleEngine};
pub use rules::{Rule, RuleContext, RuleInfo, RuleRegistry};
pub use runner::{BatchRunner, FileOutcome, FileReport, RunMode, RunnerError};
