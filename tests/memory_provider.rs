//! Tests for the in-memory backend.

use liblog::providers::MemoryProvider;
use liblog::{Level, Log, LogProvider, LogValue, Provider, args};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn bound(memory: &MemoryProvider) -> LogProvider {
    let resolver = LogProvider::new(Vec::new());
    resolver.set_current_provider(Some(Arc::new(memory.clone())));
    resolver
}

#[test]
fn disabled_level_never_evaluates_producer() {
    let memory = MemoryProvider::with_min_level(Level::Warn);
    let logger = bound(&memory).get_logger("svc");
    let calls = AtomicUsize::new(0);

    let written = logger.debug_with(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        "expensive"
    });

    assert!(!written);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(memory.is_empty());
}

#[test]
fn enabled_level_evaluates_producer_once() {
    let memory = MemoryProvider::default();
    let logger = bound(&memory).get_logger("svc");
    let calls = AtomicUsize::new(0);

    assert!(logger.info_with(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        format!("call {}", 1)
    }));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(memory.entries()[0].message, "call 1");
}

#[test]
fn enablement_follows_min_level() {
    let memory = MemoryProvider::with_min_level(Level::Info);
    let logger = bound(&memory).get_logger("svc");

    assert!(!logger.is_trace_enabled());
    assert!(!logger.is_debug_enabled());
    assert!(logger.is_info_enabled());
    assert!(logger.is_fatal_enabled());

    memory.set_min_level(Level::Trace);
    assert!(logger.is_trace_enabled());
}

#[test]
fn structured_entry_keeps_template_and_properties() {
    let memory = MemoryProvider::default();
    let logger = bound(&memory).get_logger("orders");

    logger.info_format("Order {id} shipped to {city}", &args![42, "Oslo"]);

    let entry = &memory.entries()[0];
    assert_eq!(entry.logger, "orders");
    assert_eq!(entry.level, Level::Info);
    assert_eq!(entry.template, "Order {id} shipped to {city}");
    assert_eq!(entry.message, "Order 42 shipped to Oslo");
    assert_eq!(entry.property("id"), Some(&LogValue::I64(42)));
    assert_eq!(entry.property("city"), Some(&LogValue::from("Oslo")));
}

#[test]
fn exception_is_attached() {
    let memory = MemoryProvider::default();
    let logger = bound(&memory).get_logger("io");
    let err = std::io::Error::other("disk full");

    logger.error_exception("write failed", &err);

    let entry = &memory.entries()[0];
    assert_eq!(entry.level, Level::Error);
    assert_eq!(entry.exception.as_deref(), Some("disk full"));
}

#[test]
fn format_failure_writes_descriptive_message() {
    let memory = MemoryProvider::default();
    let logger = bound(&memory).get_logger("svc");

    assert!(logger.warn_format("{a} and {b}", &args![1]));

    let entry = &memory.entries()[0];
    assert!(entry.message.contains("{a} and {b}"));
    assert!(entry.message.starts_with("failed to format message template"));
}

#[test]
fn oversized_precision_is_written_as_format_failure() {
    let memory = MemoryProvider::default();
    let logger = bound(&memory).get_logger("svc");

    assert!(logger.info_format("v={n:F70000}", &args![1.5]));

    let entry = &memory.entries()[0];
    assert!(entry.message.starts_with("failed to format message template"));
    assert!(entry.message.contains("v={n:F70000}"));
}

#[test]
fn nested_context_visible_until_guard_drops() {
    let memory = MemoryProvider::default();
    let resolver = bound(&memory);
    let logger = resolver.get_logger("svc");

    {
        let _outer = resolver.open_nested_context("request 7");
        let _inner = resolver.open_nested_context("step 2");
        logger.info("inside");
    }
    logger.info("outside");

    let entries = memory.take();
    assert_eq!(entries[0].nested_context, ["request 7", "step 2"]);
    assert!(entries[1].nested_context.is_empty());
}

#[test]
fn mapped_context_visible_until_guard_drops() {
    let memory = MemoryProvider::default();
    let resolver = bound(&memory);
    let logger = resolver.get_logger("svc");

    let guard = resolver.open_mapped_context("tenant", "acme");
    logger.info("inside");
    guard.close();
    logger.info("outside");

    let entries = memory.take();
    assert_eq!(
        entries[0].mapped_context,
        [("tenant".to_string(), "acme".to_string())]
    );
    assert!(entries[1].mapped_context.is_empty());
}

#[test]
fn contexts_are_per_thread() {
    let memory = MemoryProvider::default();
    let _guard = memory.open_nested_context("main thread");

    let log = memory.get_logger("worker");
    std::thread::spawn(move || {
        log.log(Level::Info, Some(&|| Some("from worker".to_string())), None, &[]);
    })
    .join()
    .unwrap();

    assert!(memory.entries()[0].nested_context.is_empty());
}

#[test]
fn take_drains_and_clones_share_the_buffer() {
    let memory = MemoryProvider::default();
    let other = memory.clone();
    bound(&memory).get_logger("a").info("one");

    assert_eq!(other.len(), 1);
    assert_eq!(other.take().len(), 1);
    assert!(memory.is_empty());
}
