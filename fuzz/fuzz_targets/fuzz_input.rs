#![no_main]

use deltarun::input::{read_samples, DEFAULT_COLUMN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must parse or fail on I/O, never panic
    if let Ok((samples, stats)) = read_samples(data, DEFAULT_COLUMN) {
        assert_eq!(samples.len(), stats.accepted);
        assert!(stats.accepted + stats.skipped + stats.out_of_range <= stats.lines);
        assert!(samples.iter().all(|v| (-100.0..=100.0).contains(v)));
    }
});
