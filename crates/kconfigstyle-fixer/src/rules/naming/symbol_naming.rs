//! Naming conventions for `config`/`menuconfig` symbols

use kconfigstyle_core::syntax::NodeKind;
use regex::Regex;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

const DEFAULT_PATTERN: &str = "^[A-Za-z0-9_]+$";

/// Checks symbol names for case, allowed characters, length and prefix
///
/// Parameters: `uppercase` (default true), `pattern` (regex), `max_length`,
/// `min_prefix_length` (length of the part before the first `_`).
pub struct SymbolNamingRule;

impl Rule for SymbolNamingRule {
    fn id(&self) -> &'static str {
        "symbol-naming"
    }

    fn description(&self) -> &'static str {
        "Enforce naming conventions for config symbols"
    }

    fn is_fixable(&self) -> bool {
        false
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let uppercase = ctx.params.bool("uppercase", true)?;
        let pattern = ctx.params.string("pattern", DEFAULT_PATTERN)?;
        let pattern = Regex::new(pattern)
            .map_err(|e| ctx.params.invalid("pattern", pattern, e.to_string()))?;
        let max_length = ctx.params.optional_usize("max_length")?;
        let min_prefix = ctx.params.optional_usize("min_prefix_length")?;
        let tree = ctx.tree;
        let mut diagnostics = Vec::new();

        for (_, node) in tree.nodes() {
            let NodeKind::Entry(entry) = &node.kind else {
                continue;
            };
            let (Some(name), Some(token)) = (&entry.name, entry.name_token) else {
                continue;
            };
            // Names built from macros are only known after expansion
            if name.contains("$(") {
                continue;
            }
            let span = tree.tokens()[token].span;

            if uppercase && name.chars().any(|c| c.is_lowercase()) {
                let message = format!("Config name '{}' must be uppercase", name);
                diagnostics.push(ctx.diagnostic(message, span));
            }
            if !pattern.is_match(name) {
                let message = format!("Config name '{}' contains invalid characters", name);
                diagnostics.push(ctx.diagnostic(message, span));
            }
            if let Some(max) = max_length {
                if name.chars().count() > max {
                    let message = format!("Config name '{}' exceeds {} characters", name, max);
                    diagnostics.push(ctx.diagnostic(message, span));
                }
            }
            if let Some(min) = min_prefix {
                if let Some((prefix, _)) = name.split_once('_') {
                    if prefix.chars().count() < min {
                        let message = format!(
                            "Config name '{}' prefix '{}' should be at least {} characters",
                            name, prefix, min
                        );
                        diagnostics.push(ctx.diagnostic(message, span));
                    }
                }
            }
        }

        Ok(diagnostics)
    }
}
