//! Colored console backend.
//!
//! The fallback for hosts that installed nothing but still want to see a library's output.
//! Lines look like `2024-03-07 14:05:09 [WARN]  (db::pool) connection slow`, with the error
//! (and its source chain) on the following lines.

use crate::fmt::{Color, LogValue, colorize};
use crate::internal;
use crate::level::Level;
use crate::provider::{self, Exception, Log, MessageFn, Provider};
use chrono::Local;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static IS_AVAILABLE_OVERRIDE: AtomicBool = AtomicBool::new(true);

pub fn set_provider_is_available_override(available: bool) {
    IS_AVAILABLE_OVERRIDE.store(available, Ordering::SeqCst);
}

/// A console is always there to write to; only the override can hide it.
#[must_use]
pub fn is_available() -> bool {
    IS_AVAILABLE_OVERRIDE.load(Ordering::SeqCst)
}

/// Everything a custom formatter gets to see for one entry.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleRecord<'a> {
    pub logger: &'a str,
    pub level: Level,
    pub message: &'a str,
    pub exception: Option<Exception<'a>>,
}

/// Replaces the default line layout. Colors are applied around the returned text.
pub type Formatter = Arc<dyn Fn(&ConsoleRecord<'_>) -> String + Send + Sync>;

/// Default level colors.
#[must_use]
pub fn default_level_colors() -> HashMap<Level, Color> {
    HashMap::from([
        (Level::Fatal, Color::red()),
        (Level::Error, Color::yellow()),
        (Level::Warn, Color::magenta()),
        (Level::Info, Color::white()),
        (Level::Debug, Color::gray()),
        (Level::Trace, Color::dark_gray()),
    ])
}

#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    /// Piped output and CI logs usually cannot render ANSI escapes.
    pub colors: bool,
    /// `strftime` pattern for the leading timestamp.
    pub timestamp_format: String,
    pub min_level: Level,
    /// Levels missing from the map are written uncolored.
    pub level_colors: HashMap<Level, Color>,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            colors: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            min_level: Level::Trace,
            level_colors: default_level_colors(),
        }
    }
}

/// The default layout for one entry, without colors.
#[must_use]
pub fn format_line(record: &ConsoleRecord<'_>, timestamp_format: &str) -> String {
    let mut line = String::with_capacity(record.message.len() + 48);
    // An invalid pattern only costs the timestamp, not the line.
    let _ = write!(line, "{}", Local::now().format(timestamp_format));
    let tag = format!("[{}]", record.level.label());
    let _ = write!(line, " {tag:<8}({}) {}", record.logger, record.message);

    let mut source = record.exception;
    while let Some(err) = source {
        let _ = write!(line, "\n{err}");
        source = err.source();
    }
    line
}

struct Shared {
    settings: ConsoleSettings,
    formatter: Option<Formatter>,
    /// `None` writes to stderr.
    writer: Option<Mutex<Box<dyn Write + Send>>>,
}

/// Writes colored lines to stderr or a caller-supplied writer.
#[derive(Clone)]
pub struct ConsoleProvider {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ConsoleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProvider")
            .field("settings", &self.shared.settings)
            .field("custom_formatter", &self.shared.formatter.is_some())
            .field("custom_writer", &self.shared.writer.is_some())
            .finish()
    }
}

impl ConsoleProvider {
    /// Default settings, writing to stderr.
    ///
    /// # Errors
    /// Returns [`crate::Error::ProviderNotFound`] when the availability override is off.
    pub fn new() -> Result<Self, crate::Error> {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::default()
    }

    #[must_use]
    pub fn settings(&self) -> &ConsoleSettings {
        &self.shared.settings
    }
}

/// Stepwise construction for the console backend.
#[derive(Default)]
#[must_use]
pub struct ConsoleBuilder {
    settings: ConsoleSettings,
    formatter: Option<Formatter>,
    writer: Option<Box<dyn Write + Send>>,
}

impl ConsoleBuilder {
    pub fn settings(mut self, settings: ConsoleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn colors(mut self, enabled: bool) -> Self {
        self.settings.colors = enabled;
        self
    }

    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.settings.timestamp_format = format.into();
        self
    }

    pub const fn min_level(mut self, level: Level) -> Self {
        self.settings.min_level = level;
        self
    }

    pub fn level_color(mut self, level: Level, color: Color) -> Self {
        self.settings.level_colors.insert(level, color);
        self
    }

    pub fn formatter(
        mut self,
        formatter: impl Fn(&ConsoleRecord<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Sends output somewhere other than stderr.
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// # Errors
    /// Returns [`crate::Error::ProviderNotFound`] when the availability override is off.
    pub fn build(self) -> Result<ConsoleProvider, crate::Error> {
        if !is_available() {
            return Err(crate::Error::ProviderNotFound("console"));
        }
        Ok(ConsoleProvider {
            shared: Arc::new(Shared {
                settings: self.settings,
                formatter: self.formatter,
                writer: self.writer.map(Mutex::new),
            }),
        })
    }
}

impl Provider for ConsoleProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    fn get_logger(&self, name: &str) -> Arc<dyn Log> {
        Arc::new(ConsoleLog {
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        })
    }
}

struct ConsoleLog {
    name: String,
    shared: Arc<Shared>,
}

impl ConsoleLog {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.shared.writer {
            Some(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writeln!(writer, "{line}")?;
                writer.flush()
            }
            None => writeln!(io::stderr(), "{line}"),
        }
    }
}

impl Log for ConsoleLog {
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        let settings = &self.shared.settings;
        if level < settings.min_level {
            return false;
        }
        let Some(message) = message else {
            return true;
        };
        let Some(template) = message() else {
            return false;
        };

        let text = provider::render("CONSOLE", &template, params).text;
        let record = ConsoleRecord {
            logger: &self.name,
            level,
            message: &text,
            exception,
        };
        let line = self.shared.formatter.as_ref().map_or_else(
            || format_line(&record, &settings.timestamp_format),
            |formatter| formatter(&record),
        );
        let line = match settings.level_colors.get(&level) {
            Some(color) if settings.colors => colorize(&line, *color),
            _ => line,
        };

        match self.write_line(&line) {
            Ok(()) => true,
            Err(e) => {
                internal::error("CONSOLE", &format!("Failed to write log line: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("outer failure")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn default_layout() {
        let record = ConsoleRecord {
            logger: "db",
            level: Level::Warn,
            message: "slow",
            exception: None,
        };
        let line = format_line(&record, "TS");
        assert_eq!(line, "TS [WARN]  (db) slow");
    }

    #[test]
    fn exception_chain_on_following_lines() {
        let err = Outer(std::io::Error::other("disk gone"));
        let record = ConsoleRecord {
            logger: "db",
            level: Level::Error,
            message: "write failed",
            exception: Some(&err),
        };
        let line = format_line(&record, "TS");
        assert_eq!(line, "TS [ERROR] (db) write failed\nouter failure\ndisk gone");
    }
}
