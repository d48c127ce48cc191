//! The caller-facing logger handle.
//!
//! A [`Logger`] is what libraries hold on to. It is cheap to clone and never fails: when no
//! backend could be bound it is inert, and every call on it is a no-op that reports `false`.

mod wrapper;

pub use wrapper::{
    ExecutionWrapper, FAILED_TO_GENERATE_LOG_MESSAGE, MessageError, MessageProducer,
    ProducerPanic,
};
pub(crate) use wrapper::panic_message;

use crate::fmt::LogValue;
use crate::level::Level;
use crate::provider::{Exception, Log};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Anything a lazy message closure may return.
pub trait IntoMessage {
    /// # Errors
    /// Returns the producer's own failure.
    fn into_message(self) -> Result<String, MessageError>;
}

impl IntoMessage for String {
    fn into_message(self) -> Result<String, MessageError> {
        Ok(self)
    }
}

impl IntoMessage for &str {
    fn into_message(self) -> Result<String, MessageError> {
        Ok(self.to_string())
    }
}

impl<E: Into<MessageError>> IntoMessage for Result<String, E> {
    fn into_message(self) -> Result<String, MessageError> {
        self.map_err(Into::into)
    }
}

fn constant(message: &str) -> impl Fn() -> Result<String, MessageError> + '_ {
    move || Ok(message.to_string())
}

/// A named logger.
#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
    wrapper: Option<ExecutionWrapper>,
}

macro_rules! level_methods {
    ($(
        $level:ident => $is_enabled:ident, $log:ident, $with:ident, $format:ident,
            $exception:ident, $exception_format:ident;
    )*) => {
        $(
            #[must_use]
            pub fn $is_enabled(&self) -> bool {
                self.is_enabled(Level::$level)
            }

            pub fn $log(&self, message: &str) -> bool {
                self.log(Level::$level, message)
            }

            /// The closure only runs when the level is enabled.
            pub fn $with<M: IntoMessage>(&self, producer: impl Fn() -> M) -> bool {
                let message = || producer().into_message();
                self.log_with(Level::$level, &message, None, &[])
            }

            pub fn $format(&self, template: &str, args: &[LogValue]) -> bool {
                self.log_with(Level::$level, &constant(template), None, args)
            }

            pub fn $exception(&self, message: &str, exception: Exception<'_>) -> bool {
                self.log_with(Level::$level, &constant(message), Some(exception), &[])
            }

            pub fn $exception_format(
                &self,
                template: &str,
                exception: Exception<'_>,
                args: &[LogValue],
            ) -> bool {
                self.log_with(
                    Level::$level,
                    &constant(template),
                    Some(exception),
                    args,
                )
            }
        )*
    };
}

impl Logger {
    pub(crate) fn new(name: &str, inner: Arc<dyn Log>, disabled: Arc<AtomicBool>) -> Self {
        Self {
            name: Arc::from(name),
            wrapper: Some(ExecutionWrapper::new(inner, disabled)),
        }
    }

    /// A logger that discards everything.
    #[must_use]
    pub fn noop(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            wrapper: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` when no backend was bound at creation time.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.wrapper.is_none()
    }

    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.wrapper
            .as_ref()
            .is_some_and(|w| w.log_with(level, None, None, &[]))
    }

    pub fn log(&self, level: Level, message: &str) -> bool {
        self.log_with(level, &constant(message), None, &[])
    }

    /// The general form every convenience method funnels into.
    ///
    /// Returns `true` when an entry was written.
    pub fn log_with(
        &self,
        level: Level,
        producer: MessageProducer<'_>,
        exception: Option<Exception<'_>>,
        args: &[LogValue],
    ) -> bool {
        self.wrapper
            .as_ref()
            .is_some_and(|w| w.log_with(level, Some(producer), exception, args))
    }

    level_methods! {
        Trace => is_trace_enabled, trace, trace_with, trace_format,
            trace_exception, trace_exception_format;
        Debug => is_debug_enabled, debug, debug_with, debug_format,
            debug_exception, debug_exception_format;
        Info => is_info_enabled, info, info_with, info_format,
            info_exception, info_exception_format;
        Warn => is_warn_enabled, warn, warn_with, warn_format,
            warn_exception, warn_exception_format;
        Error => is_error_enabled, error, error_with, error_format,
            error_exception, error_exception_format;
        Fatal => is_fatal_enabled, fatal, fatal_with, fatal_format,
            fatal_exception, fatal_exception_format;
    }
}
