//! Configuration struct definitions.

use crate::fmt::Color;
use crate::level::Level;
use serde::Deserialize;
use std::collections::HashMap;

/// Settings that apply to the facade as a whole.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starts with the kill switch on; every logger reports disabled and writes nothing.
    pub disabled: bool,
}

/// liblog's own diagnostic channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub level: Level,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { level: Level::Warn }
    }
}

/// Which backends take part in probing.
///
/// `tracing` and `log` only bind when the host installed them, so they are on by default.
/// `console` would bind in any process and must be opted into.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub tracing: bool,
    pub log: bool,
    pub console: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            tracing: true,
            log: true,
            console: false,
        }
    }
}

/// Console backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub colors: bool,
    /// `strftime` pattern.
    pub timestamp_format: String,
    pub min_level: Level,
    /// Overrides for individual levels, as `#RRGGBB` or a color name.
    pub level_colors: HashMap<Level, Color>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            colors: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            min_level: Level::Trace,
            level_colors: HashMap::new(),
        }
    }
}
