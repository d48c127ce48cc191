//! The process-wide resolver.
//!
//! Libraries call these free functions (or [`crate::current_logger!`]) and never construct a
//! [`LogProvider`] themselves; hosts use [`init`] and [`set_current_provider`] to steer
//! where that output goes.

use crate::config::Config;
use crate::internal;
use crate::logger::Logger;
use crate::provider::{ContextGuard, Provider};
use crate::resolver::LogProvider;
use std::sync::{Arc, LazyLock};

static LOG_PROVIDER: LazyLock<LogProvider> = LazyLock::new(LogProvider::with_default_candidates);

/// The process-wide resolver.
#[must_use]
pub fn log_provider() -> &'static LogProvider {
    &LOG_PROVIDER
}

/// Applies `config`: candidate backends, kill switch and diagnostic level. The next logger
/// request probes again; an explicit provider stays in place.
///
/// Hosts that keep their settings in the default file pass `&Config::load()?`.
pub fn init(config: &Config) {
    internal::set_level(config.diagnostics.level);
    LOG_PROVIDER.configure(config);
}

#[must_use]
pub fn get_logger(name: &str) -> Logger {
    LOG_PROVIDER.get_logger(name)
}

#[must_use]
pub fn logger_for<T: ?Sized>() -> Logger {
    LOG_PROVIDER.logger_for::<T>()
}

pub fn set_current_provider(provider: Option<Arc<dyn Provider>>) {
    LOG_PROVIDER.set_current_provider(provider);
}

#[must_use]
pub fn current_provider() -> Option<Arc<dyn Provider>> {
    LOG_PROVIDER.current_provider()
}

#[must_use]
pub fn resolve_provider() -> Option<Arc<dyn Provider>> {
    LOG_PROVIDER.resolve_provider()
}

#[must_use]
pub fn force_resolve_provider() -> Option<Arc<dyn Provider>> {
    LOG_PROVIDER.force_resolve_provider()
}

pub fn set_on_current_provider_set(
    hook: impl Fn(Option<&Arc<dyn Provider>>) + Send + Sync + 'static,
) {
    LOG_PROVIDER.set_on_current_provider_set(hook);
}

pub fn clear_on_current_provider_set() {
    LOG_PROVIDER.clear_on_current_provider_set();
}

pub fn set_disabled(disabled: bool) {
    LOG_PROVIDER.set_disabled(disabled);
}

#[must_use]
pub fn is_disabled() -> bool {
    LOG_PROVIDER.is_disabled()
}

pub fn open_nested_context(message: &str) -> ContextGuard {
    LOG_PROVIDER.open_nested_context(message)
}

pub fn open_mapped_context(key: &str, value: &str) -> ContextGuard {
    LOG_PROVIDER.open_mapped_context(key, value)
}
