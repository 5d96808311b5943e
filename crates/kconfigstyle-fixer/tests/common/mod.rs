//! Shared Kconfig samples for integration tests

#![allow(dead_code)]

use kconfigstyle_fixer::{Autofixer, FixOutcome, Preset, RuleEngine, StyleProfile};

pub const ZEPHYR_DRIVER: &str = r#"# Sensor drivers

menuconfig SENSOR
	bool "Sensor drivers"
	help
	  Include sensor drivers in the system config.

if SENSOR

config SENSOR_INIT_PRIORITY
	int "Sensor init priority"
	default 90
	help
	  Sensor initialization priority.

choice SENSOR_LOG_LEVEL_CHOICE
	prompt "Log level"
	default SENSOR_LOG_LEVEL_INF

config SENSOR_LOG_LEVEL_INF
	bool "Info"

endchoice

source "drivers/sensor/Kconfig.bme280"

endif # SENSOR
"#;

pub const ESPIDF_COMPONENT: &str = r#"menu "Wi-Fi"

    config ESP_WIFI_ENABLED
        bool "Enable Wi-Fi"
        depends on SOC_WIFI_SUPPORTED
        default y
        help
            Select this to enable Wi-Fi support.

    config ESP_WIFI_RX_BUFFER_NUM
        int "Max number of RX buffers"
        default 10
        range 2 128

endmenu
"#;

/// A file with a bit of everything wrong
pub const MESSY: &str = "#Networking  \nmenu \"Net\"\n\n\n  config NET_IPV4\n    bool \"IPv4\"\ndefault y\n    depends on NETWORKING\n  help\n     Enable IPv4.\nendmenu\n\n\n";

pub const UNTERMINATED: &str = "menu \"X\"\n\nconfig FOO\n\tbool \"Foo\"\n";

pub fn corpus() -> Vec<&'static str> {
    vec![ZEPHYR_DRIVER, ESPIDF_COMPONENT, MESSY, UNTERMINATED, "", "\n\n", "config A"]
}

pub fn fix(source: &str, preset: Preset) -> FixOutcome {
    let engine = RuleEngine::builtin();
    let profile = StyleProfile::preset(preset);
    let lint = engine.lint(source, &profile);
    Autofixer::new(&engine, &profile).fix(source, &lint.tree, &lint.diagnostics)
}
