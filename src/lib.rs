//! `liblog` - a log facade for libraries.
//!
//! A library logs through `liblog` without choosing a backend. On first use liblog probes
//! the host process for an installed backend, binds to the first one it finds and routes
//! every call there. When nothing is installed, logging is silently inert.
//!
//! Probing order:
//! - `tracing`, when a global subscriber has been set
//! - `log`, when a logger has been registered and its max level is above `Off`
//! - `console`, only when enabled in config
//!
//! Hosts can bypass probing with [`set_current_provider`], for example to install a
//! [`providers::MemoryProvider`] in tests.
//!
//! # Example
//!
//! ```
//! use liblog::providers::MemoryProvider;
//! use std::sync::Arc;
//!
//! let memory = MemoryProvider::default();
//! let resolver = liblog::LogProvider::new(Vec::new());
//! resolver.set_current_provider(Some(Arc::new(memory.clone())));
//!
//! let logger = resolver.get_logger("cache");
//! logger.info_format("Evicted {count} entries", &liblog::args![12]);
//!
//! assert_eq!(memory.entries()[0].message, "Evicted 12 entries");
//! ```
//!
//! # Features
//!
//! - `tracing` (default): binds to a global `tracing` dispatcher
//! - `log` (default): binds to the `log` facade
//! - `console` (default): colored lines on stderr

pub mod config;
mod error;
pub mod fmt;
pub mod global;
pub mod internal;
pub mod level;
pub mod logger;
pub mod provider;
pub mod providers;
pub mod resolver;

pub use config::Config;
pub use error::Error;
pub use fmt::{FormattedMessage, LogValue, MessageTemplate};
pub use global::{
    clear_on_current_provider_set, current_provider, force_resolve_provider, get_logger, init,
    is_disabled, log_provider, logger_for, open_mapped_context, open_nested_context,
    resolve_provider, set_current_provider, set_disabled, set_on_current_provider_set,
};
pub use level::Level;
pub use logger::{IntoMessage, Logger, MessageError};
pub use provider::{ContextGuard, Log, NoOpLog, Provider};
pub use resolver::{LogProvider, ProviderCandidate};

/// A logger named after the calling module, from the process-wide resolver.
///
/// ```
/// let logger = liblog::current_logger!();
/// assert_eq!(logger.name(), module_path!());
/// ```
#[macro_export]
macro_rules! current_logger {
    () => {
        $crate::global::get_logger(::std::module_path!())
    };
}
