//! Rule registry for managing available rules
//!
//! The registry keeps rules in an explicit order. That order is the fix
//! priority: when two fixes touch the same text, the rule registered first wins.

use std::collections::HashMap;
use std::sync::Arc;

use super::comments::{CommentSpacingRule, TerminatorCommentRule};
use super::help::{HelpIndentRule, HelpReflowRule};
use super::naming::SymbolNamingRule;
use super::structure::PropertyOrderRule;
use super::whitespace::{BlankLinesRule, IndentationRule, LineLengthRule, TrailingWhitespaceRule};
use super::Rule;

/// Information about a registered rule
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub fixable: bool,
}

/// Ordered collection of rules
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_id: HashMap<&'static str, usize>,
}

impl RuleRegistry {
    /// Create a registry from an explicit, ordered list
    ///
    /// A later rule with an id already present is ignored.
    pub fn from_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        let mut registry = Self {
            rules: Vec::new(),
            by_id: HashMap::new(),
        };
        for rule in rules {
            registry.register(rule);
        }
        registry
    }

    /// Create a registry with all built-in rules
    pub fn new() -> Self {
        Self::from_rules(vec![
            Arc::new(TrailingWhitespaceRule),
            Arc::new(IndentationRule),
            Arc::new(HelpIndentRule),
            Arc::new(CommentSpacingRule),
            Arc::new(BlankLinesRule),
            Arc::new(TerminatorCommentRule),
            Arc::new(PropertyOrderRule),
            Arc::new(LineLengthRule),
            Arc::new(HelpReflowRule),
            Arc::new(SymbolNamingRule),
        ])
    }

    fn register(&mut self, rule: Arc<dyn Rule>) {
        if self.by_id.contains_key(rule.id()) {
            return;
        }
        self.by_id.insert(rule.id(), self.rules.len());
        self.rules.push(rule);
    }

    /// Get a rule by its id
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.by_id.get(id).map(|&idx| &self.rules[idx])
    }

    /// Registration index of a rule, used as fix priority
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Get all rules in registration order
    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Get information about all rules
    pub fn list(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|r| RuleInfo {
                id: r.id(),
                description: r.description(),
                fixable: r.is_fixable(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ESPIDF_RULES, ZEPHYR_RULES};

    #[test]
    fn test_registry_has_rules() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.len(), 10);
        assert!(registry.get("indentation").is_some());
        assert!(registry.get("no-such-rule").is_none());
    }

    #[test]
    fn test_registration_order() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.ids()[0], "trailing-whitespace");
        assert!(registry.position("indentation") < registry.position("property-order"));
        assert!(registry.position("property-order") < registry.position("line-length"));
    }

    #[test]
    fn test_duplicate_ids_ignored() {
        let registry = RuleRegistry::from_rules(vec![
            Arc::new(IndentationRule),
            Arc::new(IndentationRule),
        ]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_presets_only_name_known_rules() {
        let registry = RuleRegistry::new();
        for id in ZEPHYR_RULES.iter().chain(ESPIDF_RULES) {
            assert!(registry.get(id).is_some(), "unknown rule {}", id);
        }
    }

    #[test]
    fn test_list() {
        let registry = RuleRegistry::new();
        let naming = registry
            .list()
            .into_iter()
            .find(|info| info.id == "symbol-naming")
            .unwrap();
        assert!(!naming.fixable);
    }
}
