//! Style profiles and the presets that build them
//!
//! A [`StyleProfile`] is constructed once per run and shared read-only by
//! every file. Rule parameters are read through [`RuleParams`], which
//! validates types and ranges and reports [`RuleConfigError`]s.

mod presets;
mod profile;
mod whitespace;

pub use presets::{get_preset_rules, preset_profile, Preset, ESPIDF_RULES, ZEPHYR_RULES};
pub use profile::{ConfigValue, RuleConfigError, RuleParams, RuleSetting, StyleProfile};
pub use whitespace::{describe, IndentStyle, Layout, INDENTATION_RULE};
