//! Containment between callers and adapters.
//!
//! A message producer is caller code running inside the logging path. If it fails or panics
//! the failure is logged as an error entry of its own and the original call writes nothing,
//! so a broken log statement never takes the caller down with it.

use crate::fmt::LogValue;
use crate::level::Level;
use crate::provider::{Exception, Log, MessageFn};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Written in place of a message whose producer failed.
pub const FAILED_TO_GENERATE_LOG_MESSAGE: &str = "Failed to generate log message";

/// What a caller-side producer may fail with.
pub type MessageError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-side producer.
pub type MessageProducer<'a> = &'a dyn Fn() -> Result<String, MessageError>;

/// Attached to the secondary entry when a producer panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerPanic(String);

impl ProducerPanic {
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProducerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message producer panicked: {}", self.0)
    }
}

impl std::error::Error for ProducerPanic {}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Wraps an adapter's logger with the kill switch and producer containment.
#[derive(Clone)]
pub struct ExecutionWrapper {
    inner: Arc<dyn Log>,
    disabled: Arc<AtomicBool>,
}

impl fmt::Debug for ExecutionWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionWrapper")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ExecutionWrapper {
    #[must_use]
    pub const fn new(inner: Arc<dyn Log>, disabled: Arc<AtomicBool>) -> Self {
        Self { inner, disabled }
    }

    /// The adapter's logger this wrapper delegates to.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn Log> {
        &self.inner
    }

    /// Writes one entry whose message comes from a fallible caller producer.
    ///
    /// `None` asks whether `level` is enabled. Returns `false` without touching the adapter
    /// while the kill switch is on.
    pub fn log_with(
        &self,
        level: Level,
        producer: Option<MessageProducer<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        if self.disabled.load(Ordering::Relaxed) {
            return false;
        }
        let Some(producer) = producer else {
            return self.inner.log(level, None, exception, params);
        };

        let guarded = || self.run_guarded(producer);
        self.inner.log(level, Some(&guarded), exception, params)
    }

    fn run_guarded(&self, producer: MessageProducer<'_>) -> Option<String> {
        match panic::catch_unwind(AssertUnwindSafe(producer)) {
            Ok(Ok(message)) => Some(message),
            Ok(Err(e)) => {
                self.report_failure(&*e);
                None
            }
            Err(payload) => {
                self.report_failure(&ProducerPanic(panic_message(payload.as_ref())));
                None
            }
        }
    }

    fn report_failure(&self, failure: Exception<'_>) {
        let message = || Some(FAILED_TO_GENERATE_LOG_MESSAGE.to_string());
        self.inner.log(Level::Error, Some(&message), Some(failure), &[]);
    }
}

impl Log for ExecutionWrapper {
    /// Adapter-shaped entry point. A producer returning `None` is an absent message, not a
    /// failure; only a panic is contained.
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        if self.disabled.load(Ordering::Relaxed) {
            return false;
        }
        let Some(message) = message else {
            return self.inner.log(level, None, exception, params);
        };

        let guarded = || {
            panic::catch_unwind(AssertUnwindSafe(message)).unwrap_or_else(|payload| {
                self.report_failure(&ProducerPanic(panic_message(payload.as_ref())));
                None
            })
        };
        self.inner.log(level, Some(&guarded), exception, params)
    }
}
