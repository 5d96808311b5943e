//! Indentation layout derived from a style profile

use kconfigstyle_core::syntax::TAB_STOP;
use serde::{Deserialize, Serialize};

use super::presets::{preset_profile, Preset};
use super::profile::{RuleConfigError, StyleProfile};

/// Rule whose parameters describe the indentation layout
pub const INDENTATION_RULE: &str = "indentation";

/// Indentation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    /// Use spaces for indentation
    Spaces(usize),
    /// Use tabs for indentation
    Tabs,
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Tabs
    }
}

impl IndentStyle {
    /// Indentation string for one level
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }

    /// Columns covered by one level
    pub fn width(&self) -> usize {
        match self {
            IndentStyle::Spaces(n) => *n,
            IndentStyle::Tabs => TAB_STOP,
        }
    }

    pub fn uses_tabs(&self) -> bool {
        matches!(self, IndentStyle::Tabs)
    }
}

/// Human-readable form of an indentation string, e.g. "1 tab and 2 spaces"
pub fn describe(ws: &str) -> String {
    let tabs = ws.chars().filter(|&c| c == '\t').count();
    let spaces = ws.chars().filter(|&c| c == ' ').count();
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("1 {}", word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    match (tabs, spaces) {
        (0, 0) => "no indentation".to_string(),
        (t, 0) => plural(t, "tab"),
        (0, s) => plural(s, "space"),
        (t, s) => format!("{} and {}", plural(t, "tab"), plural(s, "space")),
    }
}

/// Where each kind of line is expected to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub indent: IndentStyle,
    /// Indent the contents of menu/if/choice blocks
    pub nested: bool,
    /// Spaces added after the property indent for help text
    pub help_extra: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            indent: IndentStyle::Tabs,
            nested: false,
            help_extra: 2,
        }
    }
}

impl Layout {
    /// Read the layout from the `indentation` rule parameters
    ///
    /// The parameters apply even when the `indentation` rule itself is off, so
    /// help and wrapping rules agree on the same layout.
    pub fn from_profile(profile: &StyleProfile) -> Result<Self, RuleConfigError> {
        let params = profile.params(INDENTATION_RULE);
        let indent = match params.string("style", "tabs")? {
            "tabs" | "tab" => IndentStyle::Tabs,
            "spaces" | "space" => IndentStyle::Spaces(params.positive("width", 4)?),
            other => {
                return Err(params.invalid("style", other, "expected `tabs` or `spaces`"));
            }
        };
        Ok(Self {
            indent,
            nested: params.bool("nested", false)?,
            help_extra: params.usize("help_extra", 2)?,
        })
    }

    /// Layout of the preset named `profile_name`, or the default layout
    pub fn fallback(profile_name: &str) -> Self {
        Preset::from_str(profile_name)
            .and_then(|preset| Self::from_profile(&preset_profile(preset)).ok())
            .unwrap_or_default()
    }

    /// Indentation of entry, block and directive lines at `depth`
    pub fn item_indent(&self, depth: usize) -> String {
        if self.nested {
            self.indent.unit().repeat(depth)
        } else {
            String::new()
        }
    }

    /// Indentation of property lines inside an item at `depth`
    pub fn property_indent(&self, depth: usize) -> String {
        let mut indent = self.item_indent(depth);
        indent.push_str(&self.indent.unit());
        indent
    }

    /// Indentation of the first help text line of an item at `depth`
    pub fn help_indent(&self, depth: usize) -> String {
        let mut indent = self.property_indent(depth);
        indent.push_str(&" ".repeat(self.help_extra));
        indent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profile::RuleSetting;

    #[test]
    fn test_describe() {
        assert_eq!(describe(""), "no indentation");
        assert_eq!(describe("\t"), "1 tab");
        assert_eq!(describe("    "), "4 spaces");
        assert_eq!(describe("\t  "), "1 tab and 2 spaces");
        assert_eq!(describe("\t\t "), "2 tabs and 1 space");
    }

    #[test]
    fn test_default_layout() {
        let layout = Layout::from_profile(&StyleProfile::new("empty")).unwrap();
        assert_eq!(layout, Layout::default());
        assert_eq!(layout.item_indent(3), "");
        assert_eq!(layout.property_indent(3), "\t");
        assert_eq!(layout.help_indent(0), "\t  ");
    }

    #[test]
    fn test_nested_spaces() {
        let profile = StyleProfile::new("p").with_rule(
            INDENTATION_RULE,
            RuleSetting::default()
                .param("style", "spaces")
                .param("width", 4)
                .param("nested", true)
                .param("help_extra", 4),
        );
        let layout = Layout::from_profile(&profile).unwrap();
        assert_eq!(layout.item_indent(1), "    ");
        assert_eq!(layout.property_indent(1), "        ");
        assert_eq!(layout.help_indent(0), "        ");
    }

    #[test]
    fn test_invalid_style() {
        let profile = StyleProfile::new("p")
            .with_rule(INDENTATION_RULE, RuleSetting::default().param("style", "mixed"));
        let err = Layout::from_profile(&profile).unwrap_err();
        assert!(err.to_string().contains("expected `tabs` or `spaces`"));
    }

    #[test]
    fn test_fallback_uses_preset_layout() {
        let idf = Layout::fallback("esp-idf");
        assert_eq!(idf.indent, IndentStyle::Spaces(4));
        assert!(idf.nested);
        assert_eq!(Layout::fallback("zephyr").indent, IndentStyle::Tabs);
        assert_eq!(Layout::fallback("custom"), Layout::default());
    }

    #[test]
    fn test_unit_width() {
        assert_eq!(IndentStyle::Spaces(2).unit(), "  ");
        assert_eq!(IndentStyle::Tabs.unit(), "\t");
        assert_eq!(IndentStyle::Tabs.width(), 8);
    }
}
