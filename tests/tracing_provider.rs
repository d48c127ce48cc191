#![cfg(feature = "tracing")]
//! Tests for the `tracing` adapter against a capturing global subscriber.

use liblog::providers::tracing::{self as adapter, TARGET, TracingProvider};
use liblog::{Level, LogProvider, Provider, args};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct Captured {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
    spans: Vec<HashMap<String, String>>,
}

#[derive(Default, Clone)]
struct Fields(HashMap<String, String>);

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

struct Capture(Arc<Mutex<Vec<Captured>>>);

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for Capture {
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let spans = ctx
            .event_scope(event)
            .map(|scope| {
                scope
                    .from_root()
                    .filter_map(|span| span.extensions().get::<Fields>().map(|f| f.0.clone()))
                    .collect()
            })
            .unwrap_or_default();

        self.0.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
            spans,
        });
    }
}

static EVENTS: LazyLock<Arc<Mutex<Vec<Captured>>>> = LazyLock::new(|| {
    let events = Arc::new(Mutex::new(Vec::new()));
    tracing_subscriber::registry()
        .with(Capture(Arc::clone(&events)))
        .with(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init()
        .expect("global subscriber already set");
    events
});

fn provider() -> TracingProvider {
    LazyLock::force(&EVENTS);
    TracingProvider::new().unwrap()
}

fn events_for(logger: &str) -> Vec<Captured> {
    EVENTS
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.fields.get("logger").is_some_and(|l| l == logger))
        .cloned()
        .collect()
}

#[test]
#[serial]
fn available_once_a_global_subscriber_is_set() {
    LazyLock::force(&EVENTS);
    assert!(adapter::is_available());

    let resolver = LogProvider::with_default_candidates();
    assert_eq!(resolver.resolve_provider().map(|p| p.name()), Some("tracing"));
}

#[test]
#[serial]
fn override_hides_the_backend() {
    LazyLock::force(&EVENTS);
    adapter::set_provider_is_available_override(false);
    let hidden = adapter::is_available();
    let constructed = TracingProvider::new();
    adapter::set_provider_is_available_override(true);

    assert!(!hidden);
    assert!(matches!(
        constructed,
        Err(liblog::Error::ProviderNotFound("tracing"))
    ));
}

#[test]
#[serial]
fn events_carry_logger_template_and_text() {
    let log = provider().get_logger("tracing::fields");
    assert!(log.log(
        Level::Info,
        Some(&|| Some("User {user} logged in".to_string())),
        None,
        &args!["ann"],
    ));

    let events = events_for("tracing::fields");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.target, TARGET);
    assert_eq!(event.level, tracing::Level::INFO);
    assert_eq!(event.fields["message"], "User ann logged in");
    assert_eq!(event.fields["message_template"], "User {user} logged in");
    assert!(!event.fields.contains_key("exception"));
}

#[test]
#[serial]
fn fatal_folds_into_error_and_keeps_exception() {
    let log = provider().get_logger("tracing::fatal");
    let err = std::io::Error::other("disk gone");
    log.log(Level::Fatal, Some(&|| Some("dying".to_string())), Some(&err), &[]);

    let events = events_for("tracing::fatal");
    assert_eq!(events[0].level, tracing::Level::ERROR);
    assert_eq!(events[0].fields["exception"], "disk gone");
}

#[test]
#[serial]
fn filtered_level_skips_the_producer() {
    let log = provider().get_logger("tracing::filtered");
    let calls = AtomicUsize::new(0);
    let producer = || {
        calls.fetch_add(1, Ordering::SeqCst);
        Some("never".to_string())
    };

    assert!(!log.log(Level::Trace, None, None, &[]));
    assert!(!log.log(Level::Trace, Some(&producer), None, &[]));
    assert!(log.log(Level::Debug, None, None, &[]));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(events_for("tracing::filtered").is_empty());
}

#[test]
#[serial]
fn contexts_become_enclosing_spans() {
    let provider = provider();
    let log = provider.get_logger("tracing::spans");

    {
        let _nested = provider.open_nested_context("batch 9");
        let _mapped = provider.open_mapped_context("tenant", "acme");
        log.log(Level::Info, Some(&|| Some("inside".to_string())), None, &[]);
    }
    log.log(Level::Info, Some(&|| Some("outside".to_string())), None, &[]);

    let events = events_for("tracing::spans");
    assert_eq!(events[0].spans.len(), 2);
    assert_eq!(events[0].spans[0]["context"], "batch 9");
    assert_eq!(events[0].spans[1]["key"], "tenant");
    assert_eq!(events[0].spans[1]["value"], "acme");
    assert!(events[1].spans.is_empty());
}
