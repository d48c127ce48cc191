//! liblog's own diagnostic channel.
//!
//! Failures inside the facade (a broken factory, an unformattable template, a console writer
//! that went away) cannot be reported through the facade itself, so they go to a small sink of
//! their own. The default sink writes to stderr; hosts can redirect it with [`set_sink`] or raise the
//! threshold with [`set_level`].

use crate::level::Level;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Receives every diagnostic at or above the configured level.
pub type Sink = Arc<dyn Fn(Level, &str, &str) + Send + Sync>;

static SINK: RwLock<Option<Sink>> = RwLock::new(None);
static LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

/// Replaces the sink; `None` restores the stderr default.
pub fn set_sink(sink: Option<Sink>) {
    *SINK.write().unwrap_or_else(PoisonError::into_inner) = sink;
}

pub fn set_level(level: Level) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

#[must_use]
pub fn level() -> Level {
    Level::all()
        .into_iter()
        .find(|l| *l as u8 == LEVEL.load(Ordering::Relaxed))
        .unwrap_or(Level::Warn)
}

#[must_use]
pub fn enabled(level: Level) -> bool {
    level as u8 >= LEVEL.load(Ordering::Relaxed)
}

fn log(level: Level, scope: &str, msg: &str) {
    if !enabled(level) {
        return;
    }

    // Clone out of the lock so a sink that calls back into this module cannot deadlock.
    let sink = SINK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match sink {
        Some(sink) => sink(level, scope, msg),
        None => eprintln!("liblog: [{}] {scope}  {msg}", level.label()),
    }
}

/// High-volume instrumentation such as per-candidate probe results.
pub fn trace(scope: &str, msg: &str) {
    log(Level::Trace, scope, msg);
}

/// Resolution outcomes and config loading.
pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Recoverable trouble: a template that failed to render, a config include that was skipped.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

/// A backend write or a provider factory failed.
pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}
