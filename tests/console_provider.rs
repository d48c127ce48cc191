#![cfg(feature = "console")]
//! Tests for the console adapter writing into a shared buffer.

use liblog::providers::console::{self as adapter, ConsoleProvider};
use liblog::fmt::Color;
use liblog::{Level, LogProvider, Provider, args};
use serial_test::serial;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn plain(buffer: &Buffer) -> ConsoleProvider {
    ConsoleProvider::builder()
        .colors(false)
        .writer(buffer.clone())
        .build()
        .unwrap()
}

#[test]
#[serial]
fn default_layout_has_level_logger_and_text() {
    let buffer = Buffer::default();
    let log = plain(&buffer).get_logger("db");

    assert!(log.log(
        Level::Warn,
        Some(&|| Some("Query took {ms}ms".to_string())),
        None,
        &args![250],
    ));

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("[WARN]  (db) Query took 250ms"), "{}", lines[0]);
}

#[test]
#[serial]
fn custom_formatter_replaces_layout() {
    let buffer = Buffer::default();
    let provider = ConsoleProvider::builder()
        .colors(false)
        .writer(buffer.clone())
        .formatter(|record| {
            let exception = record.exception.map(ToString::to_string).unwrap_or_default();
            format!("{}|{}|{}", record.level.label(), record.message, exception)
        })
        .build()
        .unwrap();

    let err = io::Error::other("boom");
    provider
        .get_logger("svc")
        .log(Level::Error, Some(&|| Some("failed".to_string())), Some(&err), &[]);

    assert_eq!(buffer.lines(), ["ERROR|failed|boom"]);
}

#[test]
#[serial]
fn colors_wrap_the_line() {
    let buffer = Buffer::default();
    let provider = ConsoleProvider::builder()
        .writer(buffer.clone())
        .formatter(|record| record.message.to_string())
        .level_color(Level::Info, Color::green())
        .build()
        .unwrap();

    provider
        .get_logger("svc")
        .log(Level::Info, Some(&|| Some("ok".to_string())), None, &[]);

    let expected = format!("{}ok{}", Color::green().fg_ansi(), Color::RESET);
    assert_eq!(buffer.lines(), [expected]);
}

#[test]
#[serial]
fn below_min_level_writes_nothing() {
    let buffer = Buffer::default();
    let provider = ConsoleProvider::builder()
        .colors(false)
        .min_level(Level::Error)
        .writer(buffer.clone())
        .build()
        .unwrap();
    let log = provider.get_logger("svc");

    assert!(!log.log(Level::Warn, Some(&|| Some("skipped".to_string())), None, &[]));
    assert!(!log.log(Level::Warn, None, None, &[]));
    assert!(log.log(Level::Fatal, None, None, &[]));
    assert!(buffer.lines().is_empty());
}

#[test]
#[serial]
fn write_failure_returns_false() {
    let provider = ConsoleProvider::builder().writer(Broken).build().unwrap();
    let log = provider.get_logger("svc");
    assert!(!log.log(Level::Info, Some(&|| Some("lost".to_string())), None, &[]));
}

#[test]
#[serial]
fn override_blocks_construction() {
    adapter::set_provider_is_available_override(false);
    let result = ConsoleProvider::new();
    adapter::set_provider_is_available_override(true);
    assert!(matches!(result, Err(liblog::Error::ProviderNotFound("console"))));
}

#[test]
#[serial]
fn config_enables_console_candidate() {
    let config = liblog::Config::parse(
        "[providers]\ntracing = false\nlog = false\nconsole = true\n",
    )
    .unwrap();
    let resolver = LogProvider::from_config(&config);
    assert_eq!(resolver.resolve_provider().map(|p| p.name()), Some("console"));
}
