//! The seam between the facade and the backends.
//!
//! A [`Provider`] hands out [`Log`] instances by name. Everything above this module talks only
//! to these two traits; everything in `providers` implements them for one backend.

use crate::fmt::{self, FormattedMessage, LogValue};
use crate::internal;
use crate::level::Level;
use std::fmt as std_fmt;

/// Lazily evaluated message. `None` means the caller has nothing to write after all.
pub type MessageFn<'a> = &'a dyn Fn() -> Option<String>;

/// The error payload attached to a log call.
pub type Exception<'a> = &'a (dyn std::error::Error + 'static);

/// One named logger bound to a backend.
///
/// `Send + Sync` so a single logger can be shared across threads without extra locking.
pub trait Log: Send + Sync {
    /// Writes one entry, or answers whether `level` is enabled when `message` is `None`.
    ///
    /// Implementations must not invoke `message` for a disabled level and must not hold any
    /// lock while it runs. Returns `true` only when something was written (or, for a query,
    /// when the level is enabled).
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool;
}

/// A bound backend.
pub trait Provider: Send + Sync {
    /// Short backend identifier (`"tracing"`, `"log"`, ...).
    fn name(&self) -> &'static str;

    fn get_logger(&self, name: &str) -> std::sync::Arc<dyn Log>;

    /// Pushes `message` onto the backend's nested diagnostic context until the guard drops.
    fn open_nested_context(&self, message: &str) -> ContextGuard {
        let _ = message;
        ContextGuard::noop()
    }

    /// Sets `key = value` in the backend's mapped diagnostic context until the guard drops.
    fn open_mapped_context(&self, key: &str, value: &str) -> ContextGuard {
        let _ = (key, value);
        ContextGuard::noop()
    }
}

/// Closes a diagnostic context when dropped.
#[must_use = "the context closes as soon as the guard is dropped"]
pub struct ContextGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl ContextGuard {
    pub fn new(on_drop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// A guard that does nothing; used when no backend is bound or the backend has no contexts.
    pub const fn noop() -> Self {
        Self { on_drop: None }
    }

    /// Closes the context now instead of at end of scope.
    pub fn close(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.run();
    }
}

impl std_fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.debug_struct("ContextGuard")
            .field("active", &self.on_drop.is_some())
            .finish()
    }
}

/// Discards everything and reports every level as disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLog;

impl Log for NoOpLog {
    fn log(
        &self,
        _level: Level,
        _message: Option<MessageFn<'_>>,
        _exception: Option<Exception<'_>>,
        _params: &[LogValue],
    ) -> bool {
        false
    }
}

/// Renders a template for a backend without native structured logging.
///
/// A template that cannot be rendered is not dropped: the descriptive error text takes its
/// place and the failure is reported on the diagnostic channel.
pub(crate) fn render(backend: &str, template: &str, params: &[LogValue]) -> FormattedMessage {
    fmt::format_structured(template, params).unwrap_or_else(|e| {
        internal::warn(backend, &e.to_string());
        FormattedMessage {
            text: e.to_string(),
            names: Vec::new(),
        }
    })
}
