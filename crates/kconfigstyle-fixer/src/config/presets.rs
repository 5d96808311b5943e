//! Shipped style presets (Zephyr, ESP-IDF)
//!
//! Both presets run on the same engine; they differ only in which rules are
//! enabled and in the parameters those rules receive.

use super::profile::{RuleSetting, StyleProfile};

/// Available presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Zephyr,
    EspIdf,
}

impl Preset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "zephyr" => Some(Preset::Zephyr),
            "esp-idf" | "espidf" | "esp_idf" | "idf" => Some(Preset::EspIdf),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Zephyr => "zephyr",
            Preset::EspIdf => "esp-idf",
        }
    }

    pub fn all() -> &'static [Preset] {
        &[Preset::Zephyr, Preset::EspIdf]
    }
}

/// Get the list of rules enabled by a preset
pub fn get_preset_rules(preset_name: &str) -> &'static [&'static str] {
    match Preset::from_str(preset_name) {
        Some(Preset::Zephyr) => ZEPHYR_RULES,
        Some(Preset::EspIdf) => ESPIDF_RULES,
        None => &[],
    }
}

/// Zephyr preset rules
pub const ZEPHYR_RULES: &[&str] = &[
    "trailing-whitespace",
    "indentation",
    "help-indent",
    "comment-spacing",
    "blank-lines",
    "property-order",
    "line-length",
    "symbol-naming",
];

/// ESP-IDF preset rules
pub const ESPIDF_RULES: &[&str] = &[
    "trailing-whitespace",
    "indentation",
    "help-indent",
    "comment-spacing",
    "blank-lines",
    "property-order",
    "line-length",
    "symbol-naming",
];

const ZEPHYR_ORDER: &[&str] = &[
    "type",
    "prompt",
    "default",
    "depends",
    "select",
    "imply",
    "range",
    "option",
    "visible",
    "modules",
    "optional",
    "transitional",
    "help",
];

const ESPIDF_ORDER: &[&str] = &[
    "type",
    "prompt",
    "depends",
    "default",
    "select",
    "imply",
    "range",
    "option",
    "visible",
    "modules",
    "optional",
    "transitional",
    "help",
];

/// Build the full profile of a preset
pub fn preset_profile(preset: Preset) -> StyleProfile {
    let mut profile = StyleProfile::new(preset.name());
    let enabled = match preset {
        Preset::Zephyr => ZEPHYR_RULES,
        Preset::EspIdf => ESPIDF_RULES,
    };
    for rule in enabled {
        profile.enable(rule);
    }

    match preset {
        Preset::Zephyr => {
            profile.set_param("indentation", "style", "tabs");
            profile.set_param("indentation", "nested", false);
            profile.set_param("indentation", "help_extra", 2);

            profile.set_param("blank-lines", "max_consecutive", 1);
            profile.set_param("blank-lines", "separate_entries", true);

            profile.set_param("property-order", "order", ZEPHYR_ORDER);

            profile.set_param("line-length", "max", 100);
            profile.set_param("line-length", "wrap", true);

            profile.set_param("symbol-naming", "uppercase", true);
            profile.set_param("symbol-naming", "max_length", 50);
        }
        Preset::EspIdf => {
            profile.set_param("indentation", "style", "spaces");
            profile.set_param("indentation", "width", 4);
            profile.set_param("indentation", "nested", true);
            profile.set_param("indentation", "help_extra", 4);

            profile.set_param("blank-lines", "max_consecutive", 1);
            profile.set_param("blank-lines", "separate_entries", false);

            profile.set_param("property-order", "order", ESPIDF_ORDER);

            profile.set_param("line-length", "max", 120);
            profile.set_param("line-length", "wrap", true);

            profile.set_param("symbol-naming", "uppercase", true);
            profile.set_param("symbol-naming", "min_prefix_length", 3);
            profile.set_param("symbol-naming", "max_length", 50);
        }
    }

    profile.with_rule("terminator-comment", RuleSetting::disabled().param("mode", "require"))
        .with_rule("help-reflow", RuleSetting::disabled().param("width", 80))
}
