#![cfg(feature = "log")]
//! Tests for the `log` adapter against a capturing global logger.

use liblog::providers::LogCrateProvider;
use liblog::providers::log as adapter;
use liblog::{Level, LogProvider, Provider, args};
use log::kv::{self, Key, Value, VisitSource};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    level: log::Level,
    target: String,
    text: String,
    kv: HashMap<String, String>,
}

struct Pairs(HashMap<String, String>);

impl<'kvs> VisitSource<'kvs> for Pairs {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

struct Capture(Mutex<Vec<Captured>>);

impl log::Log for Capture {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record<'_>) {
        let mut pairs = Pairs(HashMap::new());
        record.key_values().visit(&mut pairs).unwrap();
        self.0.lock().unwrap().push(Captured {
            level: record.level(),
            target: record.target().to_string(),
            text: record.args().to_string(),
            kv: pairs.0,
        });
    }

    fn flush(&self) {}
}

static CAPTURE: LazyLock<&'static Capture> = LazyLock::new(|| {
    let capture: &'static Capture = Box::leak(Box::new(Capture(Mutex::new(Vec::new()))));
    log::set_logger(capture).unwrap();
    log::set_max_level(log::LevelFilter::Debug);
    capture
});

fn provider() -> LogCrateProvider {
    LazyLock::force(&CAPTURE);
    LogCrateProvider::new().unwrap()
}

fn records_for(target: &str) -> Vec<Captured> {
    CAPTURE
        .0
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.target == target)
        .cloned()
        .collect()
}

#[test]
#[serial]
fn available_once_max_level_is_raised() {
    LazyLock::force(&CAPTURE);
    assert!(adapter::is_available());

    // No global tracing subscriber exists in this test binary.
    let resolver = LogProvider::with_default_candidates();
    assert_eq!(resolver.resolve_provider().map(|p| p.name()), Some("log"));
}

#[test]
#[serial]
fn override_hides_the_backend() {
    LazyLock::force(&CAPTURE);
    adapter::set_provider_is_available_override(false);
    let hidden = adapter::is_available();
    adapter::set_provider_is_available_override(true);
    assert!(!hidden);
}

#[test]
#[serial]
fn logger_name_becomes_target() {
    let log = provider().get_logger("app::db");
    assert!(log.log(Level::Warn, Some(&|| Some("slow query".to_string())), None, &[]));

    let records = records_for("app::db");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, log::Level::Warn);
    assert_eq!(records[0].text, "slow query");
    assert!(records[0].kv.is_empty());
}

#[test]
#[serial]
fn named_arguments_and_exception_become_key_values() {
    let log = provider().get_logger("app::orders");
    let err = std::io::Error::other("timeout");
    log.log(
        Level::Fatal,
        Some(&|| Some("Order {id} failed".to_string())),
        Some(&err),
        &args![7],
    );

    let records = records_for("app::orders");
    assert_eq!(records[0].level, log::Level::Error);
    assert_eq!(records[0].text, "Order 7 failed");
    assert_eq!(records[0].kv["id"], "7");
    assert_eq!(records[0].kv["exception"], "timeout");
}

#[test]
#[serial]
fn filtered_level_skips_the_producer() {
    let log = provider().get_logger("app::quiet");
    let calls = AtomicUsize::new(0);
    let producer = || {
        calls.fetch_add(1, Ordering::SeqCst);
        Some("never".to_string())
    };

    assert!(!log.log(Level::Trace, Some(&producer), None, &[]));
    assert!(!log.log(Level::Trace, None, None, &[]));
    assert!(log.log(Level::Debug, None, None, &[]));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(records_for("app::quiet").is_empty());
}

#[test]
#[serial]
fn format_failure_is_still_written() {
    let log = provider().get_logger("app::broken");
    assert!(log.log(Level::Info, Some(&|| Some("{0} {1}".to_string())), None, &args![1]));

    let records = records_for("app::broken");
    assert!(records[0].text.starts_with("failed to format message template"));
}
