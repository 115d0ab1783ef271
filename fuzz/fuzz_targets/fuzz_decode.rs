#![no_main]

use deltarun::artifacts::{self, Artifact};
use deltarun::{Direct, Packed, RunLayout};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly, never panic
    for artifact in [Artifact::Quantized, Artifact::Rle, Artifact::DeltaRle, Artifact::DoubleDeltaRle] {
        let _ = artifacts::reconstruct(artifact, data);
    }

    // Packed records may arrive in a longer form than needed; they must
    // still re-encode to something that decodes to the same runs
    if let Ok(runs) = Packed::decode(data) {
        assert!(runs.iter().all(|r| r.count >= 1 && r.count <= 4));
        let bytes = Packed::encode(&runs).expect("decoded runs re-encode");
        assert!(bytes.len() <= data.len());
        assert_eq!(Packed::decode(&bytes).ok(), Some(runs), "packed re-encode mismatch");
    }
    if let Ok(runs) = Direct::decode(data) {
        assert_eq!(Direct::encode(&runs).ok().as_deref(), Some(data), "direct re-encode mismatch");
    }
});
