//! Adapter for the `log` facade.
//!
//! The logger name becomes the record target, so `env_logger`-style filters keyed on targets
//! work unchanged. Named template arguments and the error travel as key-values.

use crate::fmt::{self, LogValue};
use crate::internal;
use crate::level::Level;
use crate::provider::{Exception, Log, MessageFn, Provider};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static IS_AVAILABLE_OVERRIDE: AtomicBool = AtomicBool::new(true);

pub fn set_provider_is_available_override(available: bool) {
    IS_AVAILABLE_OVERRIDE.store(available, Ordering::SeqCst);
}

/// `log` starts with `max_level() == Off` and only a host that installs a logger raises it.
#[must_use]
pub fn is_available() -> bool {
    IS_AVAILABLE_OVERRIDE.load(Ordering::SeqCst) && ::log::max_level() != ::log::LevelFilter::Off
}

/// Folding table from liblog levels to `log` levels.
#[must_use]
pub const fn to_log_level(level: Level) -> ::log::Level {
    match level {
        Level::Trace => ::log::Level::Trace,
        Level::Debug => ::log::Level::Debug,
        Level::Info => ::log::Level::Info,
        Level::Warn => ::log::Level::Warn,
        Level::Error | Level::Fatal => ::log::Level::Error,
    }
}

/// Binds to whatever logger the host registered with `log::set_logger`.
#[derive(Debug, Clone, Copy)]
pub struct LogCrateProvider(());

impl LogCrateProvider {
    /// # Errors
    /// Returns [`crate::Error::ProviderNotFound`] when `log`'s max level is `Off`.
    pub fn new() -> Result<Self, crate::Error> {
        if !is_available() {
            return Err(crate::Error::ProviderNotFound("log"));
        }
        Ok(Self(()))
    }
}

impl Provider for LogCrateProvider {
    fn name(&self) -> &'static str {
        "log"
    }

    fn get_logger(&self, name: &str) -> Arc<dyn Log> {
        Arc::new(LogCrateLog {
            name: name.to_string(),
        })
    }
}

struct LogCrateLog {
    name: String,
}

impl Log for LogCrateLog {
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        let log_level = to_log_level(level);
        if !::log::log_enabled!(target: self.name.as_str(), log_level) {
            return false;
        }
        let Some(message) = message else {
            return true;
        };
        let Some(template) = message() else {
            return false;
        };

        let (text, names) = match fmt::format_structured(&template, params) {
            Ok(formatted) => (formatted.text, formatted.names),
            Err(e) => {
                internal::warn("LOG", &e.to_string());
                (e.to_string(), Vec::new())
            }
        };

        let mut pairs: Vec<(String, String)> = fmt::properties(&names, params)
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if let Some(exception) = exception {
            pairs.push(("exception".to_string(), exception.to_string()));
        }
        let pairs: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let source: &[(&str, &str)] = &pairs;

        ::log::logger().log(
            &::log::Record::builder()
                .args(format_args!("{text}"))
                .level(log_level)
                .target(&self.name)
                .key_values(&source)
                .build(),
        );
        true
    }
}
