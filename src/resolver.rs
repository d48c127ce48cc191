//! Provider resolution.
//!
//! A [`LogProvider`] owns an ordered list of candidate backends. The first request for a
//! logger probes them in order, binds the first one that is available and caches the answer,
//! including "nothing available", so probing happens once. An explicit provider set with
//! [`LogProvider::set_current_provider`] takes precedence over anything probed.

use crate::config::Config;
use crate::internal;
use crate::logger::Logger;
use crate::provider::{ContextGuard, Provider};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Availability = Box<dyn Fn() -> bool + Send + Sync>;
type Factory = Box<dyn Fn() -> Result<Arc<dyn Provider>, crate::Error> + Send + Sync>;

/// Observes every change of the explicit provider.
pub type ProviderSetHook = Arc<dyn Fn(Option<&Arc<dyn Provider>>) + Send + Sync>;

/// One backend the resolver may bind to.
pub struct ProviderCandidate {
    name: &'static str,
    is_available: Availability,
    factory: Factory,
}

impl ProviderCandidate {
    /// `is_available` is asked in priority order; `factory` runs for the first candidate that
    /// answers `true`.
    ///
    /// Both run while the resolver holds its cache lock. They must not call back into the
    /// same [`LogProvider`] (`get_logger`, `resolve_provider`, ...) or the call deadlocks.
    pub fn new(
        name: &'static str,
        is_available: impl Fn() -> bool + Send + Sync + 'static,
        factory: impl Fn() -> Result<Arc<dyn Provider>, crate::Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            is_available: Box::new(is_available),
            factory: Box::new(factory),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ProviderCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCandidate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Binds to a global `tracing` dispatcher.
#[cfg(feature = "tracing")]
#[must_use]
pub fn tracing_candidate() -> ProviderCandidate {
    use crate::providers::tracing::{TracingProvider, is_available};
    ProviderCandidate::new("tracing", is_available, || {
        Ok(Arc::new(TracingProvider::new()?) as Arc<dyn Provider>)
    })
}

/// Binds to the logger registered with the `log` facade.
#[cfg(feature = "log")]
#[must_use]
pub fn log_candidate() -> ProviderCandidate {
    use crate::providers::log::{LogCrateProvider, is_available};
    ProviderCandidate::new("log", is_available, || {
        Ok(Arc::new(LogCrateProvider::new()?) as Arc<dyn Provider>)
    })
}

/// Binds to the console.
#[cfg(feature = "console")]
#[must_use]
pub fn console_candidate(settings: crate::providers::ConsoleSettings) -> ProviderCandidate {
    use crate::providers::console::{ConsoleProvider, is_available};
    ProviderCandidate::new("console", is_available, move || {
        let provider = ConsoleProvider::builder()
            .settings(settings.clone())
            .build()?;
        Ok(Arc::new(provider) as Arc<dyn Provider>)
    })
}

/// The built-in candidates, in priority order, for the backends `config` enables.
#[must_use]
pub fn candidates_from_config(config: &Config) -> Vec<ProviderCandidate> {
    let mut candidates = Vec::new();

    #[cfg(feature = "tracing")]
    if config.providers.tracing {
        candidates.push(tracing_candidate());
    }
    #[cfg(feature = "log")]
    if config.providers.log {
        candidates.push(log_candidate());
    }
    #[cfg(feature = "console")]
    if config.providers.console {
        candidates.push(console_candidate(config.console_settings()));
    }

    candidates
}

/// Resolves, caches and overrides the provider loggers are created from.
pub struct LogProvider {
    candidates: RwLock<Vec<ProviderCandidate>>,
    /// Outer `None`: not resolved yet. Inner `None`: resolved to nothing.
    resolved: Mutex<Option<Option<Arc<dyn Provider>>>>,
    current: RwLock<Option<Arc<dyn Provider>>>,
    on_set: RwLock<Option<ProviderSetHook>>,
    disabled: Arc<AtomicBool>,
}

impl fmt::Debug for LogProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates: Vec<&str> = self
            .candidates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ProviderCandidate::name)
            .collect();
        f.debug_struct("LogProvider")
            .field("candidates", &candidates)
            .field("current", &self.current_provider().map(|p| p.name()))
            .field("disabled", &self.is_disabled())
            .finish_non_exhaustive()
    }
}

impl Default for LogProvider {
    fn default() -> Self {
        Self::with_default_candidates()
    }
}

impl LogProvider {
    #[must_use]
    pub fn new(candidates: Vec<ProviderCandidate>) -> Self {
        Self {
            candidates: RwLock::new(candidates),
            resolved: Mutex::new(None),
            current: RwLock::new(None),
            on_set: RwLock::new(None),
            disabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `tracing` then `log`, whichever cargo features are compiled in.
    #[must_use]
    pub fn with_default_candidates() -> Self {
        Self::new(candidates_from_config(&Config::default()))
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let provider = Self::new(candidates_from_config(config));
        provider.set_disabled(config.general.disabled);
        provider
    }

    /// Replaces the candidates and kill switch with those described by `config` and forgets
    /// any probed provider. An explicit provider stays in place.
    pub fn configure(&self, config: &Config) {
        *self
            .candidates
            .write()
            .unwrap_or_else(PoisonError::into_inner) = candidates_from_config(config);
        *self.lock_resolved() = None;
        self.set_disabled(config.general.disabled);
        internal::debug("RESOLVER", &format!("Configured: {self:?}"));
    }

    /// The explicit provider if one is set, otherwise the cached probe result, probing on
    /// first use.
    #[must_use]
    pub fn resolve_provider(&self) -> Option<Arc<dyn Provider>> {
        if let Some(current) = self.current_provider() {
            return Some(current);
        }

        let mut resolved = self.lock_resolved();
        resolved
            .get_or_insert_with(|| {
                let provider = self.probe();
                match &provider {
                    Some(p) => internal::debug("RESOLVER", &format!("Bound to {}", p.name())),
                    None => internal::debug("RESOLVER", "No provider available, logging is inert"),
                }
                provider
            })
            .clone()
    }

    /// Probes the candidates without consulting or updating the cache.
    #[must_use]
    pub fn force_resolve_provider(&self) -> Option<Arc<dyn Provider>> {
        self.probe()
    }

    fn probe(&self) -> Option<Arc<dyn Provider>> {
        let candidates = self
            .candidates
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let candidate = candidates.iter().find(|c| {
                let available = (c.is_available)();
                internal::trace(
                    "RESOLVER",
                    &format!("Candidate {}: available={available}", c.name),
                );
                available
            })?;
            match (candidate.factory)() {
                Ok(provider) => Some(provider),
                Err(e) => {
                    internal::error(
                        "RESOLVER",
                        &format!("Failed to create {} provider: {e}", candidate.name),
                    );
                    None
                }
            }
        }));

        outcome.unwrap_or_else(|payload| {
            internal::error(
                "RESOLVER",
                &format!(
                    "Provider resolution panicked: {}",
                    crate::logger::panic_message(payload.as_ref())
                ),
            );
            None
        })
    }

    /// Sets or clears the explicit provider and notifies the hook.
    ///
    /// Clearing also forgets the probed provider, so the next logger request probes again.
    pub fn set_current_provider(&self, provider: Option<Arc<dyn Provider>>) {
        if provider.is_none() {
            *self.lock_resolved() = None;
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = provider.clone();
        self.raise_on_set(provider.as_ref());
    }

    #[must_use]
    pub fn current_provider(&self) -> Option<Arc<dyn Provider>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs the hook and immediately reports the current explicit provider to it.
    pub fn set_on_current_provider_set(
        &self,
        hook: impl Fn(Option<&Arc<dyn Provider>>) + Send + Sync + 'static,
    ) {
        let hook: ProviderSetHook = Arc::new(hook);
        *self.on_set.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&hook));
        hook(self.current_provider().as_ref());
    }

    pub fn clear_on_current_provider_set(&self) {
        *self.on_set.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn raise_on_set(&self, provider: Option<&Arc<dyn Provider>>) {
        let hook = self
            .on_set
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook(provider);
        }
    }

    /// Kill switch: while set, every logger handed out by this resolver reports disabled and
    /// writes nothing.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// A logger named `name`, or an inert one when no provider is available.
    #[must_use]
    pub fn get_logger(&self, name: &str) -> Logger {
        self.resolve_provider().map_or_else(
            || Logger::noop(name),
            |provider| Logger::new(name, provider.get_logger(name), Arc::clone(&self.disabled)),
        )
    }

    /// A logger named after `T`'s type path.
    #[must_use]
    pub fn logger_for<T: ?Sized>(&self) -> Logger {
        self.get_logger(std::any::type_name::<T>())
    }

    pub fn open_nested_context(&self, message: &str) -> ContextGuard {
        self.resolve_provider()
            .map_or_else(ContextGuard::noop, |p| p.open_nested_context(message))
    }

    pub fn open_mapped_context(&self, key: &str, value: &str) -> ContextGuard {
        self.resolve_provider()
            .map_or_else(ContextGuard::noop, |p| p.open_mapped_context(key, value))
    }

    fn lock_resolved(&self) -> std::sync::MutexGuard<'_, Option<Option<Arc<dyn Provider>>>> {
        self.resolved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
