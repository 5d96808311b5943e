//! Configuration file support for kconfigstyle
//!
//! Loads `.kconfigstyle.toml` from current directory or parent directories.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kconfigstyle_fixer::{Preset, RuleRegistry, RuleSetting, StyleProfile};

pub const CONFIG_FILE_NAME: &str = ".kconfigstyle.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preset to start from (zephyr, esp-idf)
    pub preset: Option<String>,
    /// Per-rule overrides layered over the preset
    pub rules: BTreeMap<String, RuleSetting>,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.kconfigstyle.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the preset, letting `cli_preset` override the file
    pub fn preset(&self, cli_preset: Option<&str>) -> Result<Preset> {
        let name = cli_preset.or(self.preset.as_deref()).unwrap_or("zephyr");
        match Preset::from_str(name) {
            Some(preset) => Ok(preset),
            None => bail!("Unknown preset '{}'. Valid options: zephyr, esp-idf", name),
        }
    }

    /// Build the effective profile: preset, then `[rules.*]` tables, then CLI toggles
    pub fn profile(
        &self,
        preset: Preset,
        registry: &RuleRegistry,
        enable: &[String],
        disable: &[String],
    ) -> Result<StyleProfile> {
        let mut profile = StyleProfile::preset(preset);

        for (rule, setting) in &self.rules {
            check_rule(registry, rule)
                .with_context(|| format!("Invalid [rules.{}] table", rule))?;
            profile.merge(rule, setting.clone());
        }
        for rule in enable {
            check_rule(registry, rule)?;
            profile.enable(rule);
        }
        for rule in disable {
            check_rule(registry, rule)?;
            profile.disable(rule);
        }

        Ok(profile)
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match anywhere in the path
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

fn check_rule(registry: &RuleRegistry, rule: &str) -> Result<()> {
    if registry.get(rule).is_none() {
        bail!(
            "Unknown rule '{}'. Use --list-rules to see available rules.",
            rule
        );
    }
    Ok(())
}
