//! In-process buffer backend.
//!
//! Keeps every entry with its template, rendered text, named properties and the diagnostic
//! contexts that were open on the logging thread. Embedding hosts use it to collect a
//! library's output; test suites use it to assert on exactly what was logged.

use crate::fmt::{self, LogValue};
use crate::internal;
use crate::level::Level;
use crate::provider::{ContextGuard, Exception, Log, MessageFn, Provider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

static IS_AVAILABLE_OVERRIDE: AtomicBool = AtomicBool::new(true);

/// Lets tests hide the backend from availability checks.
pub fn set_provider_is_available_override(available: bool) {
    IS_AVAILABLE_OVERRIDE.store(available, Ordering::SeqCst);
}

/// Needs nothing from the host, so only the override can make it unavailable.
#[must_use]
pub fn is_available() -> bool {
    IS_AVAILABLE_OVERRIDE.load(Ordering::SeqCst)
}

/// One captured log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub logger: String,
    pub level: Level,
    /// The template as the caller wrote it.
    pub template: String,
    /// The template after substitution.
    pub message: String,
    /// Placeholder name to argument, in placeholder order.
    pub properties: Vec<(String, LogValue)>,
    /// `Display` of the attached error, if any.
    pub exception: Option<String>,
    /// Nested contexts open on the logging thread, outermost first.
    pub nested_context: Vec<String>,
    /// Mapped contexts open on the logging thread; the innermost value wins for a repeated key.
    pub mapped_context: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&LogValue> {
        self.properties
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }
}

#[derive(Default)]
struct ThreadContexts {
    nested: Vec<(u64, String)>,
    mapped: Vec<(u64, String, String)>,
}

struct Shared {
    entries: Mutex<Vec<LogEntry>>,
    contexts: Mutex<HashMap<ThreadId, ThreadContexts>>,
    min_level: AtomicU8,
    next_token: AtomicU64,
}

impl Shared {
    fn enabled(&self, level: Level) -> bool {
        level as u8 >= self.min_level.load(Ordering::Relaxed)
    }

    fn snapshot_contexts(&self) -> (Vec<String>, Vec<(String, String)>) {
        let contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(ctx) = contexts.get(&thread::current().id()) else {
            return (Vec::new(), Vec::new());
        };

        let nested = ctx.nested.iter().map(|(_, m)| m.clone()).collect();
        let mut mapped: Vec<(String, String)> = Vec::new();
        for (_, key, value) in &ctx.mapped {
            match mapped.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1.clone_from(value),
                None => mapped.push((key.clone(), value.clone())),
            }
        }
        (nested, mapped)
    }

    fn with_thread_contexts<R>(
        &self,
        thread: ThreadId,
        f: impl FnOnce(&mut ThreadContexts) -> R,
    ) -> R {
        let mut contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
        let ctx = contexts.entry(thread).or_default();
        let result = f(ctx);
        if ctx.nested.is_empty() && ctx.mapped.is_empty() {
            contexts.remove(&thread);
        }
        result
    }
}

/// Buffers entries in memory. Clones share the same buffer.
#[derive(Clone)]
pub struct MemoryProvider {
    shared: Arc<Shared>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::with_min_level(Level::Trace)
    }
}

impl std::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("min_level", &self.min_level())
            .field("entries", &self.len())
            .finish()
    }
}

impl MemoryProvider {
    /// Captures every level.
    ///
    /// # Errors
    /// Returns [`crate::Error::ProviderNotFound`] when the availability override is off.
    pub fn new() -> Result<Self, crate::Error> {
        if !is_available() {
            return Err(crate::Error::ProviderNotFound("memory"));
        }
        Ok(Self::default())
    }

    #[must_use]
    pub fn with_min_level(level: Level) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Vec::new()),
                contexts: Mutex::new(HashMap::new()),
                min_level: AtomicU8::new(level as u8),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    pub fn set_min_level(&self, level: Level) {
        self.shared.min_level.store(level as u8, Ordering::Relaxed);
    }

    #[must_use]
    pub fn min_level(&self) -> Level {
        let raw = self.shared.min_level.load(Ordering::Relaxed);
        Level::all()
            .into_iter()
            .find(|l| *l as u8 == raw)
            .unwrap_or(Level::Trace)
    }

    /// A copy of everything captured so far, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock_entries().clone()
    }

    /// Drains the buffer.
    #[must_use]
    pub fn take(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.lock_entries())
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        self.shared
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_token(&self) -> u64 {
        self.shared.next_token.fetch_add(1, Ordering::Relaxed)
    }
}

impl Provider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_logger(&self, name: &str) -> Arc<dyn Log> {
        Arc::new(MemoryLog {
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        })
    }

    fn open_nested_context(&self, message: &str) -> ContextGuard {
        let token = self.next_token();
        let thread = thread::current().id();
        self.shared.with_thread_contexts(thread, |ctx| {
            ctx.nested.push((token, message.to_string()));
        });

        let shared = Arc::clone(&self.shared);
        ContextGuard::new(move || {
            shared.with_thread_contexts(thread, |ctx| ctx.nested.retain(|(t, _)| *t != token));
        })
    }

    fn open_mapped_context(&self, key: &str, value: &str) -> ContextGuard {
        let token = self.next_token();
        let thread = thread::current().id();
        self.shared.with_thread_contexts(thread, |ctx| {
            ctx.mapped.push((token, key.to_string(), value.to_string()));
        });

        let shared = Arc::clone(&self.shared);
        ContextGuard::new(move || {
            shared.with_thread_contexts(thread, |ctx| ctx.mapped.retain(|(t, _, _)| *t != token));
        })
    }
}

struct MemoryLog {
    name: String,
    shared: Arc<Shared>,
}

impl Log for MemoryLog {
    fn log(
        &self,
        level: Level,
        message: Option<MessageFn<'_>>,
        exception: Option<Exception<'_>>,
        params: &[LogValue],
    ) -> bool {
        if !self.shared.enabled(level) {
            return false;
        }
        let Some(message) = message else {
            return true;
        };
        let Some(template) = message() else {
            return false;
        };

        let (text, properties) = match fmt::format_structured(&template, params) {
            Ok(formatted) => {
                let properties = fmt::properties(&formatted.names, params);
                (formatted.text, properties)
            }
            Err(e) => {
                internal::warn("MEMORY", &e.to_string());
                (e.to_string(), fmt::properties(&[], params))
            }
        };
        let (nested_context, mapped_context) = self.shared.snapshot_contexts();

        let entry = LogEntry {
            logger: self.name.clone(),
            level,
            template,
            message: text,
            properties,
            exception: exception.map(ToString::to_string),
            nested_context,
            mapped_context,
        };
        self.shared
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        true
    }
}
