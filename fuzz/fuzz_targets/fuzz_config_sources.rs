#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Must not panic on any config content
    let (sources, _remaining) = liblog::config::extract_sources(data);
    assert!(sources.len() <= data.lines().count());
});
