//! TOML configuration loading and `source = "..."` include resolution.
//!
//! Separated from struct definitions so that the loading logic (file I/O, cycle detection,
//! merge strategy) stays independent of the serde schema.

mod structs;

pub use structs::{ConsoleConfig, DiagnosticsConfig, GeneralConfig, ProvidersConfig};

use crate::internal;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Table;

const CONFIG_FILE: &str = "liblog.toml";

/// An empty file, or no file at all, yields the defaults: probe `tracing` then `log`, and
/// stay silent when neither is installed.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub diagnostics: DiagnosticsConfig,
    pub providers: ProvidersConfig,
    pub console: ConsoleConfig,
}

/// Scans raw TOML for `source = "..."` directives before deserialization, since serde
/// cannot handle them. Returns the extracted paths and the remaining TOML content stripped
/// of those lines.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("source")
            && rest.trim_start().starts_with('=')
        {
            let path = rest
                .trim_start()
                .trim_start_matches('=')
                .trim()
                .trim_matches('"')
                .trim_matches('\'');
            if !path.is_empty() {
                sources.push(path.to_string());
            }
        } else {
            remaining.push_str(line);
            remaining.push('\n');
        }
    }

    (sources, remaining)
}

/// Folds `other` into `base` without overwriting keys `base` already has; tables merge
/// recursively so an include can fill in single fields of a section.
#[doc(hidden)]
pub fn merge_tables(base: &mut Table, other: Table) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (Some(_), _) => {}
            (None, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl Config {
    /// Loads `<config_dir>/liblog.toml` with all includes resolved. A missing file yields
    /// the defaults.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined, a file can't be read, TOML parsing
    /// hits a syntax error, or includes form a cycle.
    pub fn load() -> Result<Self, crate::Error> {
        internal::debug("CONFIG", "Loading config from default location");
        let config_path = Self::get_config_path()?;
        let config = Self::load_from(&config_path)?;
        internal::debug(
            "CONFIG",
            &format!("Config loaded from {}", config_path.display()),
        );
        Ok(config)
    }

    /// Loads configuration from an explicit path instead of the default location.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or contains cyclic includes.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        let table = Self::load_with_sources(path, &mut HashSet::new())?;
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Parses TOML text. `source` lines are resolved relative to the working directory.
    ///
    /// # Errors
    /// Returns error on a syntax error or when an include fails to load.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        let table = Self::expand(content, None, &mut HashSet::new())?;
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Recursive loader that expands `source = "..."` includes while tracking visited paths
    /// in `seen` to break include cycles.
    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Table, crate::Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Table::new());
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if !seen.insert(canonical.clone()) {
            internal::warn(
                "CONFIG",
                &format!("Cyclic include detected: {}", canonical.display()),
            );
            return Err(crate::Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        Self::expand(&content, path.parent(), seen)
    }

    fn expand(
        content: &str,
        base_dir: Option<&Path>,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<Table, crate::Error> {
        let (sources, toml_content) = extract_sources(content);
        let mut table: Table = toml::from_str(&toml_content)?;

        for source_path in sources {
            internal::debug("CONFIG", &format!("Processing source: {source_path}"));
            let expanded = shellexpand::tilde(&source_path);
            let mut source_file = PathBuf::from(expanded.as_ref());
            if source_file.is_relative()
                && let Some(base_dir) = base_dir
            {
                source_file = base_dir.join(source_file);
            }

            if source_file.exists() {
                let included = Self::load_with_sources(&source_file, seen)?;
                merge_tables(&mut table, included);
            } else {
                internal::warn("CONFIG", &format!("Source file not found: {source_path}"));
            }
        }

        Ok(table)
    }

    /// `<config_dir>/liblog.toml`, where `config_dir` is the platform's per-user config
    /// directory (`~/.config` on Linux).
    ///
    /// # Errors
    /// Fails when the platform has no concept of a config directory.
    pub fn get_config_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(crate::Error::ConfigDirNotFound)
    }

    /// Console backend settings described by the `[console]` section.
    #[cfg(feature = "console")]
    #[must_use]
    pub fn console_settings(&self) -> crate::providers::ConsoleSettings {
        let mut level_colors = crate::providers::console::default_level_colors();
        level_colors.extend(self.console.level_colors.iter().map(|(l, c)| (*l, *c)));

        crate::providers::ConsoleSettings {
            colors: self.console.colors,
            timestamp_format: self.console.timestamp_format.clone(),
            min_level: self.console.min_level,
            level_colors,
        }
    }
}
