#![no_main]

use deltarun::artifacts::{self, Artifact};
use deltarun::pipeline;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Each byte pair is one reading spread over the whole accepted window
    let readings: Vec<f64> = data
        .chunks_exact(2)
        .map(|c| f64::from(u16::from_le_bytes([c[0], c[1]])) / f64::from(u16::MAX) * 200.0 - 100.0)
        .collect();

    // Property 1: every in-range stream encodes
    let encoded = pipeline::encode_samples(&readings, false).expect("in-range readings always pack");
    assert_eq!(encoded.quantized.len(), readings.len());

    // Property 2: every serialized stream reconstructs the codes
    for artifact in [Artifact::Quantized, Artifact::Rle, Artifact::DeltaRle, Artifact::DoubleDeltaRle] {
        let bytes = artifact.serialized(&encoded).expect("artifact has a serialized form");
        let back = artifacts::reconstruct(artifact, bytes).ok().flatten();
        assert_eq!(back.as_deref(), Some(encoded.quantized.as_slice()), "{artifact:?} mismatch");
    }

    // Property 3: baseline is two bytes per sample
    assert_eq!(encoded.baseline.len(), readings.len() * 2);

    // Property 4: the report covers every strategy
    if !readings.is_empty() {
        let report = encoded.report("fuzz").expect("non-empty input");
        assert_eq!(report.rows().len(), 4);
    }
});
