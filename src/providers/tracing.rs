//! Adapter for the `tracing` ecosystem.
//!
//! Every event is emitted with the fixed target `liblog` because `tracing` callsites need a
//! static target; the logger name travels in the `logger` field instead. `tracing` has no
//! `Fatal`, so it folds into `ERROR`.

use crate::fmt::LogValue;
use crate::level::Level;
use crate::provider::{self, ContextGuard, Exception, Log, MessageFn, Provider};
use ::tracing::field::display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Target of every event and span this adapter emits.
pub const TARGET: &str = "liblog";

static IS_AVAILABLE_OVERRIDE: AtomicBool = AtomicBool::new(true);

pub fn set_provider_is_available_override(available: bool) {
    IS_AVAILABLE_OVERRIDE.store(available, Ordering::SeqCst);
}

/// A global dispatcher must have been installed; a scoped `with_default` subscriber is not
/// enough because the binding outlives the scope.
#[must_use]
pub fn is_available() -> bool {
    IS_AVAILABLE_OVERRIDE.load(Ordering::SeqCst) && ::tracing::dispatcher::has_been_set()
}

/// Folding table from liblog levels to `tracing` levels.
#[must_use]
pub const fn to_tracing_level(level: Level) -> ::tracing::Level {
    match level {
        Level::Trace => ::tracing::Level::TRACE,
        Level::Debug => ::tracing::Level::DEBUG,
        Level::Info => ::tracing::Level::INFO,
        Level::Warn => ::tracing::Level::WARN,
        Level::Error | Level::Fatal => ::tracing::Level::ERROR,
    }
}

/// Binds to the global `tracing` dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct TracingProvider(());

impl TracingProvider {
    /// # Errors
    /// Returns [`crate::Error::ProviderNotFound`] when no global dispatcher is installed.
    pub fn new() -> Result<Self, crate::Error> {
        if !is_available() {
            return Err(crate::Error::ProviderNotFound("tracing"));
        }
        Ok(Self(()))
    }
}

impl Provider for TracingProvider {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn get_logger(&self, name: &str) -> Arc<dyn Log> {
        Arc::new(TracingLog {
            name: name.to_string(),
        })
    }

    fn open_nested_context(&self, message: &str) -> ContextGuard {
        enter(::tracing::info_span!(target: TARGET, "nested_context", context = message))
    }

    fn open_mapped_context(&self, key: &str, value: &str) -> ContextGuard {
        enter(::tracing::info_span!(target: TARGET, "mapped_context", key = key, value = value))
    }
}

/// Enters `span` on the current dispatcher and exits it when the guard drops.
///
/// `Span::entered` would tie the guard to the thread, but context guards must be `Send`.
fn enter(span: ::tracing::Span) -> ContextGuard {
    span.with_subscriber(|(id, dispatch)| dispatch.enter(id));
    ContextGuard::new(move || {
        span.with_subscriber(|(id, dispatch)| dispatch.exit(id));
    })
}

struct TracingLog {
    name: String,
}

/// Expands `$body!` once per `tracing` level, since callsites need the level as a constant.
macro_rules! dispatch_level {
    ($level:expr, $body:ident!($($arg:tt)*)) => {
        match $level {
            Level::Trace => $body!(::tracing::Level::TRACE, $($arg)*),
            Level::Debug => $body!(::tracing::Level::DEBUG, $($arg)*),
            Level::Info => $body!(::tracing::Level::INFO, $($arg)*),
            Level::Warn => $body!(::tracing::Level::WARN, $($arg)*),
            Level::Error | Level::Fatal => $body!(::tracing::Level::ERROR, $($arg)*),
        }
    };
}

macro_rules! is_enabled {
    ($tracing_level:expr $(,)?) => {
        ::tracing::enabled!(target: TARGET, $tracing_level)
    };
}

macro_rules! emit {
    ($tracing_level:expr, $logger:expr, $exception:expr, $template:expr, $text:expr) => {
        ::tracing::event!(
            target: TARGET,
            $tracing_level,
            logger = $logger,
            exception = $exception,
            message_template = $template,
            "{}",
            $text
        )
    };
}

impl Log for TracingLog {
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        if !dispatch_level!(level, is_enabled!()) {
            return false;
        }
        let Some(message) = message else {
            return true;
        };
        let Some(template) = message() else {
            return false;
        };

        let text = provider::render("TRACING", &template, params).text;
        let logger = self.name.as_str();
        let exception = exception.map(display);
        let template = template.as_str();
        dispatch_level!(level, emit!(logger, exception, template, text));
        true
    }
}
