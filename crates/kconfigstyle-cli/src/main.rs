//! kconfigstyle CLI - Kconfig style checker and formatter
//!
//! Checks Kconfig files against the Zephyr or ESP-IDF style and optionally
//! rewrites them in place.
//!
//! Exit codes: 0 when no issues remain, 1 when issues remain, 2 on I/O or
//! configuration errors.

mod config;
mod output;
mod process;

use anyhow::{anyhow, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use kconfigstyle_fixer::config::{ESPIDF_RULES, ZEPHYR_RULES};
use kconfigstyle_fixer::{BatchRunner, FileOutcome, RuleEngine, RunMode};
use output::{OutputFormat, Reporter};
use process::{discover, read_file, write_file};

const EXIT_ISSUES: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "kconfigstyle")]
#[command(version)]
#[command(about = "Check and fix the formatting of Kconfig files")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Report issues without changing files (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply fixes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Style preset: zephyr, esp-idf
    #[arg(long, short = 'p', value_name = "PRESET")]
    preset: Option<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .kconfigstyle.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Enable a rule (can be specified multiple times)
    #[arg(long, value_name = "RULE")]
    enable: Vec<String>,

    /// Disable a rule (can be specified multiple times)
    #[arg(long, value_name = "RULE")]
    disable: Vec<String>,

    /// Number of worker threads (0 = one per core)
    #[arg(long, short = 'j', value_name = "N", default_value_t = 0)]
    jobs: usize,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Whether fixed text is written back; `--check` keeps files untouched
    fn writes_fixes(&self) -> bool {
        self.fix && !self.check
    }

    fn run_mode(&self, format: OutputFormat) -> RunMode {
        // Diff output needs the fixed text even when nothing is written
        if self.writes_fixes() || format == OutputFormat::Diff {
            RunMode::Fix
        } else {
            RunMode::Check
        }
    }
}

/// Set `cancel` on the first Ctrl-C
///
/// Files already being processed finish; the rest are reported as cancelled.
fn cancel_on_interrupt(cancel: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "interrupt handler unavailable");
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "Interrupted, finishing files in progress...".yellow());
                cancel.store(true, Ordering::SeqCst);
            }
        });
    });
}

/// Initialize the tracing subscriber for logging.
///
/// `--debug` wins over `RUST_LOG`; without either only warnings are shown.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("kconfigstyle=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kconfigstyle=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    debug!(?cli, "starting");

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let engine = RuleEngine::builtin();

    if cli.list_rules {
        print_rules(&engine);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli)?;

    let format_name = cli
        .format
        .as_deref()
        .or(config.output.format.as_deref())
        .unwrap_or("text");
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::from_str(format_name).ok_or_else(|| {
            anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format_name
            )
        })?
    };

    let preset = config.preset(cli.preset.as_deref())?;
    let profile = config.profile(preset, engine.registry(), &cli.enable, &cli.disable)?;

    if cli.verbose && output_format == OutputFormat::Text {
        println!("{}: {}", "Preset".bold(), preset.name());
        println!(
            "{}: {}",
            "Mode".bold(),
            if cli.writes_fixes() { "fix" } else { "check" }
        );
        let enabled: Vec<&str> = engine
            .registry()
            .ids()
            .into_iter()
            .filter(|id| profile.is_enabled(id))
            .collect();
        println!("{}: {}", "Rules".bold(), enabled.join(", "));
        println!();
    }

    let discovery = discover(&cli.paths, &config);
    for path in &discovery.missing {
        eprintln!(
            "{}: Path does not exist: {}",
            "Error".red(),
            path.display()
        );
    }

    let cancel = Arc::new(AtomicBool::new(false));
    cancel_on_interrupt(Arc::clone(&cancel));
    let reports = BatchRunner::new(&engine, &profile)
        .jobs(cli.jobs)
        .cancel_flag(cancel)
        .run(discovery.files, read_file, cli.run_mode(output_format))?;

    let mut reporter = Reporter::new(output_format, cli.verbose, preset.name());
    for report in reports {
        let path = &report.input;
        match &report.outcome {
            FileOutcome::Checked { diagnostics } => reporter.report_check(path, diagnostics),
            FileOutcome::Fixed { original, outcome } => {
                let mut written = false;
                if cli.writes_fixes() && outcome.changed {
                    if let Err(e) = write_file(path, &outcome.text) {
                        reporter.report_error(path, &format!("{:#}", e));
                        continue;
                    }
                    written = true;
                }
                reporter.report_fix(path, original, outcome, written);
            }
            FileOutcome::ReadError(message) => reporter.report_error(path, message),
            FileOutcome::Cancelled => reporter.report_error(path, "cancelled"),
        }
    }

    let summary = reporter.summary().clone();
    reporter.finish(cli.writes_fixes())?;

    let exit_code = if summary.errors > 0 || !discovery.missing.is_empty() {
        ExitCode::from(EXIT_FAILURE)
    } else if summary.diagnostics > 0 {
        ExitCode::from(EXIT_ISSUES)
    } else {
        ExitCode::SUCCESS
    };
    Ok(exit_code)
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }
    if let Some(config_path) = &cli.config {
        debug!(path = %config_path.display(), "using config");
        return Config::load_path(config_path);
    }
    match Config::load()? {
        Some((config, path)) => {
            debug!(path = %path.display(), "using config");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn print_rules(engine: &RuleEngine) {
    println!("{}", "Available rules:".bold());
    for info in engine.registry().list() {
        let mut presets = Vec::new();
        if ZEPHYR_RULES.contains(&info.id) {
            presets.push("zephyr");
        }
        if ESPIDF_RULES.contains(&info.id) {
            presets.push("esp-idf");
        }
        let presets = if presets.is_empty() {
            "off by default".to_string()
        } else {
            presets.join(", ")
        };
        let fixable = if info.fixable { " (fixable)" } else { "" };
        println!(
            "  {}{} - {} [{}]",
            info.id.green(),
            fixable,
            info.description,
            presets.dimmed()
        );
    }
}
