//! Style profiles: which rules run, and with what parameters

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::presets::{preset_profile, Preset};
use crate::diagnostic::Severity;

/// Configuration value types for rule parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(i64),
    String(String),
    Array(Vec<String>),
}

impl ConfigValue {
    fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Number(_) => "a number",
            ConfigValue::String(_) => "a string",
            ConfigValue::Array(_) => "a list",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::String(s) => write!(f, "{:?}", s),
            ConfigValue::Array(items) => write!(f, "{:?}", items),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Number(i64::from(value))
    }
}

impl From<usize> for ConfigValue {
    fn from(value: usize) -> Self {
        ConfigValue::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<&[&str]> for ConfigValue {
    fn from(value: &[&str]) -> Self {
        ConfigValue::Array(value.iter().map(|s| s.to_string()).collect())
    }
}

/// A rule's parameters are unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleConfigError {
    #[error("parameter `{param}` of rule `{rule}` must be {expected}, found {found}")]
    InvalidType {
        rule: String,
        param: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("parameter `{param}` of rule `{rule}` has invalid value {value}: {reason}")]
    InvalidValue {
        rule: String,
        param: String,
        value: String,
        reason: String,
    },
}

/// Per-rule entry of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetting {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(flatten)]
    pub params: BTreeMap<String, ConfigValue>,
}

fn default_enabled() -> bool {
    true
}

impl Default for RuleSetting {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
            params: BTreeMap::new(),
        }
    }
}

impl RuleSetting {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// A named, parameterized set of enabled rules
///
/// Rules missing from `rules` do not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub name: String,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
}

impl StyleProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: BTreeMap::new(),
        }
    }

    /// Profile for one of the shipped presets
    pub fn preset(preset: Preset) -> Self {
        preset_profile(preset)
    }

    pub fn with_rule(mut self, rule: &str, setting: RuleSetting) -> Self {
        self.rules.insert(rule.to_string(), setting);
        self
    }

    pub fn setting(&self, rule: &str) -> Option<&RuleSetting> {
        self.rules.get(rule)
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        self.rules.get(rule).is_some_and(|s| s.enabled)
    }

    pub fn enable(&mut self, rule: &str) {
        self.rules.entry(rule.to_string()).or_default().enabled = true;
    }

    pub fn disable(&mut self, rule: &str) {
        if let Some(setting) = self.rules.get_mut(rule) {
            setting.enabled = false;
        }
    }

    pub fn set_param(&mut self, rule: &str, key: &str, value: impl Into<ConfigValue>) {
        let setting = self
            .rules
            .entry(rule.to_string())
            .or_insert_with(RuleSetting::disabled);
        setting.params.insert(key.to_string(), value.into());
    }

    /// Layer `setting` over the current entry for `rule`
    ///
    /// Parameters merge key by key. `enabled` always replaces, `severity` only
    /// when set.
    pub fn merge(&mut self, rule: &str, setting: RuleSetting) {
        let current = self
            .rules
            .entry(rule.to_string())
            .or_insert_with(RuleSetting::disabled);
        current.enabled = setting.enabled;
        if setting.severity.is_some() {
            current.severity = setting.severity;
        }
        current.params.extend(setting.params);
    }

    /// Parameters of `rule`, whether or not it is enabled
    pub fn params<'a>(&'a self, rule: &'a str) -> RuleParams<'a> {
        RuleParams {
            rule,
            params: self.rules.get(rule).map(|s| &s.params),
        }
    }
}

/// Typed, validated access to one rule's parameters
#[derive(Debug, Clone, Copy)]
pub struct RuleParams<'a> {
    rule: &'a str,
    params: Option<&'a BTreeMap<String, ConfigValue>>,
}

impl<'a> RuleParams<'a> {
    pub fn new(rule: &'a str, params: &'a BTreeMap<String, ConfigValue>) -> Self {
        Self {
            rule,
            params: Some(params),
        }
    }

    pub fn rule(&self) -> &'a str {
        self.rule
    }

    fn get(&self, key: &str) -> Option<&'a ConfigValue> {
        self.params.and_then(|p| p.get(key))
    }

    fn type_error(&self, key: &str, expected: &'static str, found: &ConfigValue) -> RuleConfigError {
        RuleConfigError::InvalidType {
            rule: self.rule.to_string(),
            param: key.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn invalid(&self, key: &str, value: impl fmt::Display, reason: impl Into<String>) -> RuleConfigError {
        RuleConfigError::InvalidValue {
            rule: self.rule.to_string(),
            param: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn bool(&self, key: &str, default: bool) -> Result<bool, RuleConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::Bool(b)) => Ok(*b),
            Some(other) => Err(self.type_error(key, "a boolean", other)),
        }
    }

    /// Non-negative integer
    pub fn usize(&self, key: &str, default: usize) -> Result<usize, RuleConfigError> {
        Ok(self.optional_usize(key)?.unwrap_or(default))
    }

    pub fn optional_usize(&self, key: &str) -> Result<Option<usize>, RuleConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(ConfigValue::Number(n)) => usize::try_from(*n)
                .map(Some)
                .map_err(|_| self.invalid(key, n, "must not be negative")),
            Some(other) => Err(self.type_error(key, "a number", other)),
        }
    }

    /// Integer greater than zero
    pub fn positive(&self, key: &str, default: usize) -> Result<usize, RuleConfigError> {
        let value = self.usize(key, default)?;
        if value == 0 {
            return Err(self.invalid(key, value, "must be greater than zero"));
        }
        Ok(value)
    }

    pub fn string(&self, key: &str, default: &'a str) -> Result<&'a str, RuleConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(ConfigValue::String(s)) => Ok(s.as_str()),
            Some(other) => Err(self.type_error(key, "a string", other)),
        }
    }

    pub fn list(&self, key: &str, default: &[&str]) -> Result<Vec<String>, RuleConfigError> {
        match self.get(key) {
            None => Ok(default.iter().map(|s| s.to_string()).collect()),
            Some(ConfigValue::Array(items)) => Ok(items.clone()),
            Some(other) => Err(self.type_error(key, "a list", other)),
        }
    }
}
