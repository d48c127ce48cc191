//! Tests for the level taxonomy.

use liblog::{Error, Level};

#[test]
fn level_ordering() {
    assert!(Level::Trace < Level::Debug);
    assert!(Level::Debug < Level::Info);
    assert!(Level::Info < Level::Warn);
    assert!(Level::Warn < Level::Error);
    assert!(Level::Error < Level::Fatal);
}

#[test]
fn level_display() {
    assert_eq!(Level::Trace.to_string(), "trace");
    assert_eq!(Level::Warn.to_string(), "warn");
    assert_eq!(Level::Fatal.to_string(), "fatal");
    assert_eq!(Level::Fatal.label(), "FATAL");
}

#[test]
fn level_from_str() {
    assert_eq!("trace".parse::<Level>().unwrap(), Level::Trace);
    assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
    assert_eq!("Information".parse::<Level>().unwrap(), Level::Info);
    assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
    assert_eq!("err".parse::<Level>().unwrap(), Level::Error);
    assert_eq!("critical".parse::<Level>().unwrap(), Level::Fatal);
}

#[test]
fn level_from_str_invalid() {
    let err: Error = "loud".parse::<Level>().unwrap_err().into();
    assert!(matches!(err, Error::InvalidLevel(ref s) if s == "loud"));
}

#[test]
fn level_default() {
    assert_eq!(Level::default(), Level::Info);
}

#[test]
fn all_is_sorted() {
    let all = Level::all();
    assert!(all.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(all.len(), 6);
}
