#![no_main]
use libfuzzer_sys::fuzz_target;
use liblog::fmt::MessageTemplate;

fuzz_target!(|data: &str| {
    // Must not panic on any template string, and every name needs a slot
    let template = MessageTemplate::parse(data);
    for i in 0..template.names().len() {
        assert!(template.format().contains(&format!("{{{i}")));
    }

    let _ = liblog::fmt::format(data, &liblog::args!["a", 1, 2.5, true]);
});
