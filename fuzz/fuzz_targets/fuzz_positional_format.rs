#![no_main]
use libfuzzer_sys::fuzz_target;
use liblog::fmt::render_positional;

fuzz_target!(|data: &str| {
    // Malformed items and specifiers must come back as errors, never panics
    let _ = render_positional(data, data, &liblog::args![-7, 0.125, "x", 4_000_000_000u64]);
});
