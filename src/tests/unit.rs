use std::io::Cursor;
use std::num::NonZeroU8;
use std::path::Path;

use clap::ValueEnum;

use crate::artifacts::{self, Artifact};
use crate::constants::{DELTA_MAX_RUN, DIRECT_MAX_RUN, SAMPLE_MAX};
use crate::format::{baseline_size, decode_baseline, encode_baseline};
use crate::input::read_samples;
use crate::pipeline::{self, Encoded};
use crate::quantize::{dequantize, from_container, is_valid, quantize, quantize_all, to_container};
use crate::report::{compression_ratio, space_savings};
use crate::{delta, rle};
use crate::{DecodeError, Direct, PackError, Packed, Report, ReportError, Run, RunLayout, Strategy};

fn max_run(n: u8) -> NonZeroU8 {
    NonZeroU8::new(n).unwrap()
}

/// Readings used by several tests: a cold night with one fault sentinel
const NIGHT: [f64; 7] = [-10.0, -10.0, -10.1, 999.0, -10.2, -10.2, -10.2];

// ============================================================================
// Quantizer
// ============================================================================

#[test]
fn test_quantize_known_codes() {
    assert_eq!(quantize(-40.0), 0);
    assert_eq!(quantize(0.0), 3971);
    assert_eq!(quantize(20.0), 5957);
    assert_eq!(quantize(-10.0), 2978);
    assert_eq!(quantize(-10.1), 2968);
    assert_eq!(quantize(100.0), 13901);
    assert_eq!(quantize(1.25), 4096);
}

#[test]
fn test_quantize_truncates() {
    // 20.0 scales to 23831.27 -> 23831 >> 2 = 5957 (5957.75 truncated, not rounded)
    assert_eq!(quantize(20.0), 5957);
    assert_ne!(quantize(20.0), 5958);
}

#[test]
fn test_quantize_saturates() {
    assert_eq!(quantize(125.0), SAMPLE_MAX);
    assert_eq!(quantize(-100.0), 0);
    assert_eq!(quantize(-40.001), 0);
}

#[test]
fn test_readings_below_sensor_range_clamp_to_zero() {
    // Valid readings, but below the sensor's -40 floor: all collapse onto code 0
    assert_eq!(quantize_all([-100.0, -60.0, -40.0]), vec![0, 0, 0]);
    assert_eq!(dequantize(0), -40.0);
}

#[test]
fn test_container_low_bits_zero() {
    for v in [-40.0, -12.3, 0.0, 20.0, 99.9, 125.0] {
        let raw = to_container(quantize(v));
        assert_eq!(raw & 0b11, 0, "low bits set for {v}");
        assert_eq!(from_container(raw), quantize(v));
    }
}

#[test]
fn test_dequantize_lower_edge() {
    for v in [-39.5, -10.0, 0.0, 22.5, 99.0] {
        let back = dequantize(quantize(v));
        assert!(back <= v + 1e-9, "{back} > {v}");
        assert!(v - back < 165.0 / 16384.0, "{v} too far from {back}");
    }
}

#[test]
fn test_fault_filtering() {
    assert!(!is_valid(999.0));
    assert!(!is_valid(-999.0));
    assert!(!is_valid(100.01));
    assert!(!is_valid(f64::NAN));
    assert!(is_valid(100.0));
    assert!(is_valid(-100.0));

    let codes = quantize_all([20.0, 999.0, -999.0, 20.0]);
    assert_eq!(codes, vec![5957, 5957]);
}

// ============================================================================
// Delta transform
// ============================================================================

#[test]
fn test_delta_sign_convention() {
    // previous - current, first against an implicit zero
    assert_eq!(delta::encode(&[10, 12, 12, 9]), vec![-10, -2, 0, 3]);
}

#[test]
fn test_delta_roundtrip() {
    let values = [2978, 2978, 2968, 2959, 2959, 2959];
    let d = delta::encode(&values);
    assert_eq!(delta::decode(&d), values);

    let dd = delta::encode(&d);
    assert_eq!(dd, vec![2978, -2978, -10, 1, 9, 0]);
    assert_eq!(delta::decode(&delta::decode(&dd)), values);
}

#[test]
fn test_delta_empty_and_single() {
    assert!(delta::encode(&[]).is_empty());
    assert!(delta::decode(&[]).is_empty());
    assert_eq!(delta::encode(&[42]), vec![-42]);
    assert_eq!(delta::decode(&[-42]), vec![42]);
}

#[test]
fn test_delta_wraps_at_extremes() {
    let values = [i32::MIN, i32::MAX, 0, i32::MIN];
    assert_eq!(delta::decode(&delta::encode(&values)), values);
    assert_eq!(delta::decode(&delta::decode(&delta::encode(&delta::encode(&values)))), values);
}

// ============================================================================
// Run-length codec
// ============================================================================

#[test]
fn test_rle_empty() {
    assert!(rle::encode(&[], DELTA_MAX_RUN).is_empty());
    assert!(rle::decode(&[]).is_empty());
}

#[test]
fn test_rle_single_element() {
    assert_eq!(rle::encode(&[7], DELTA_MAX_RUN), vec![Run::new(1, 7)]);
}

#[test]
fn test_rle_basic() {
    let values = [2978, 2978, 2968, 2959, 2959, 2959];
    let runs = rle::encode(&values, DIRECT_MAX_RUN);
    assert_eq!(runs, vec![Run::new(2, 2978), Run::new(1, 2968), Run::new(3, 2959)]);
    assert_eq!(rle::decode(&runs), values);
}

#[test]
fn test_rle_boundary_at_max_run() {
    // M + 1 identical values -> exactly two records, the first carrying M
    let values = [0; 5];
    let runs = rle::encode(&values, DELTA_MAX_RUN);
    assert_eq!(runs, vec![Run::new(4, 0), Run::new(1, 0)]);

    let values = [0; 4];
    assert_eq!(rle::encode(&values, DELTA_MAX_RUN), vec![Run::new(4, 0)]);
}

#[test]
fn test_rle_long_run_direct() {
    let values = vec![5957; 600];
    let runs = rle::encode(&values, DIRECT_MAX_RUN);
    assert_eq!(runs, vec![Run::new(255, 5957), Run::new(255, 5957), Run::new(90, 5957)]);
    assert_eq!(rle::decode(&runs), values);
}

#[test]
fn test_rle_max_run_one() {
    let values = [3, 3, 3];
    let runs = rle::encode(&values, max_run(1));
    assert_eq!(runs, vec![Run::new(1, 3); 3]);
}

#[test]
fn test_rle_run_breaks_on_value_change_after_forced_flush() {
    let values = [1, 1, 1, 1, 1, 2, 2];
    let runs = rle::encode(&values, DELTA_MAX_RUN);
    assert_eq!(runs, vec![Run::new(4, 1), Run::new(1, 1), Run::new(2, 2)]);
}

// ============================================================================
// Packed layout
// ============================================================================

#[test]
fn test_packed_inline_boundary() {
    assert_eq!(Packed::encoded_len(&Run::new(1, 15)), Ok(1));
    assert_eq!(Packed::encoded_len(&Run::new(1, -16)), Ok(1));
    assert_eq!(Packed::encoded_len(&Run::new(1, 16)), Ok(2));
    assert_eq!(Packed::encoded_len(&Run::new(1, -17)), Ok(2));
    assert_eq!(Packed::encoded_len(&Run::new(1, 2047)), Ok(2));
    assert_eq!(Packed::encoded_len(&Run::new(1, -2048)), Ok(2));
    assert_eq!(Packed::encoded_len(&Run::new(1, 2048)), Ok(3));
    assert_eq!(Packed::encoded_len(&Run::new(1, -2049)), Ok(3));
    assert_eq!(Packed::encoded_len(&Run::new(1, -16383)), Ok(3));
    assert_eq!(Packed::encoded_len(&Run::new(1, 32766)), Ok(3));
}

#[test]
fn test_packed_exact_bytes() {
    assert_eq!(Packed::encode(&[Run::new(1, 15)]).unwrap(), vec![0x0F]);
    assert_eq!(Packed::encode(&[Run::new(4, -1)]).unwrap(), vec![0x7F]);
    assert_eq!(Packed::encode(&[Run::new(2, 16)]).unwrap(), vec![0xB0, 0x00]);
    assert_eq!(Packed::encode(&[Run::new(1, -17)]).unwrap(), vec![0x8F, 0x7F]);
    assert_eq!(Packed::encode(&[Run::new(3, 2047)]).unwrap(), vec![0xDF, 0x3F]);
    assert_eq!(Packed::encode(&[Run::new(1, -2048)]).unwrap(), vec![0x80, 0x40]);
    assert_eq!(Packed::encode(&[Run::new(3, 4095)]).unwrap(), vec![0xDF, 0xFF, 0x00]);
    assert_eq!(Packed::encode(&[Run::new(1, -5957)]).unwrap(), vec![0x9B, 0xC5, 0x0E]);
    assert_eq!(Packed::encode(&[Run::new(4, 32767)]).unwrap(), vec![0xFF, 0xFF, 0x07]);
    assert_eq!(Packed::encode(&[Run::new(1, -32768)]).unwrap(), vec![0x80, 0x80, 0x08]);
}

#[test]
fn test_packed_roundtrip_edges() {
    let runs = vec![
        Run::new(1, 0),
        Run::new(4, 15),
        Run::new(2, -16),
        Run::new(3, 16),
        Run::new(1, -17),
        Run::new(4, 2047),
        Run::new(1, -2048),
        Run::new(2, 2048),
        Run::new(1, -16383),
        Run::new(3, 32767),
        Run::new(1, -32768),
    ];
    let bytes = Packed::encode(&runs).unwrap();
    assert_eq!(bytes.len(), Packed::size(&runs).unwrap());
    assert_eq!(bytes.len(), 1 + 1 + 1 + 2 + 2 + 2 + 2 + 3 + 3 + 3 + 3);
    assert_eq!(Packed::decode(&bytes).unwrap(), runs);
}

#[test]
fn test_packed_payload_overflow() {
    assert_eq!(
        Packed::encode(&[Run::new(1, 32768)]),
        Err(PackError::PayloadOverflow { value: 32768, bits: 16 })
    );
    assert_eq!(
        Packed::encode(&[Run::new(1, -32769)]),
        Err(PackError::PayloadOverflow { value: -32769, bits: 16 })
    );
}

#[test]
fn test_packed_count_out_of_range() {
    assert_eq!(
        Packed::encoded_len(&Run::new(5, 0)),
        Err(PackError::CountOutOfRange { count: 5, max: 4 })
    );
    assert_eq!(
        Packed::encoded_len(&Run::new(0, 0)),
        Err(PackError::CountOutOfRange { count: 0, max: 4 })
    );
}

#[test]
fn test_packed_write_leaves_buffer_untouched_on_error() {
    let mut out = vec![0xAA];
    assert!(Packed::write_run(&Run::new(1, 100_000), &mut out).is_err());
    assert_eq!(out, vec![0xAA]);
}

#[test]
fn test_packed_third_byte_high_nibble_rejected() {
    assert_eq!(Packed::decode(&[0x80, 0x80, 0x18]), Err(DecodeError::ExtraBits { offset: 2, raw: 0x18 }));
}

#[test]
fn test_packed_truncated() {
    assert_eq!(Packed::decode(&[0x0F, 0x80]), Err(DecodeError::Truncated { offset: 1, needed: 1 }));
    assert_eq!(Packed::decode(&[0x9B, 0xC5]), Err(DecodeError::Truncated { offset: 0, needed: 1 }));
    assert_eq!(Packed::decode(&[]), Ok(vec![]));
}

// ============================================================================
// Direct layout and baseline
// ============================================================================

#[test]
fn test_direct_exact_bytes() {
    let bytes = Direct::encode(&[Run::new(3, 5957)]).unwrap();
    assert_eq!(bytes, vec![3, 0x17, 0x45]);
    assert_eq!(Direct::decode(&bytes).unwrap(), vec![Run::new(3, 5957)]);
}

#[test]
fn test_direct_rejects_bad_records() {
    assert_eq!(
        Direct::encode(&[Run::new(1, 70_000)]),
        Err(PackError::PayloadOverflow { value: 70_000, bits: 16 })
    );
    assert_eq!(
        Direct::encode(&[Run::new(1, -1)]),
        Err(PackError::PayloadOverflow { value: -1, bits: 16 })
    );
    assert_eq!(
        Direct::encode(&[Run::new(0, 1)]),
        Err(PackError::CountOutOfRange { count: 0, max: 255 })
    );
    assert_eq!(Direct::decode(&[0, 0, 1]), Err(DecodeError::ZeroCount { offset: 0 }));
    assert_eq!(Direct::decode(&[1, 0, 1, 2]), Err(DecodeError::Truncated { offset: 3, needed: 2 }));
}

#[test]
fn test_baseline_bytes() {
    let bytes = encode_baseline(&[5957, 0]).unwrap();
    assert_eq!(bytes, vec![0x5D, 0x14, 0x00, 0x00]);
    assert_eq!(bytes.len(), baseline_size(2));
    assert_eq!(decode_baseline(&bytes).unwrap(), vec![5957, 0]);
}

#[test]
fn test_baseline_errors() {
    assert_eq!(
        encode_baseline(&[SAMPLE_MAX + 1]),
        Err(PackError::PayloadOverflow { value: 16384, bits: 14 })
    );
    assert_eq!(decode_baseline(&[0x5D]), Err(DecodeError::Truncated { offset: 0, needed: 1 }));
    assert_eq!(
        decode_baseline(&[0x00, 0x00, 0x00, 0x01]),
        Err(DecodeError::ReservedBits { offset: 2, raw: 1 })
    );
}

// ============================================================================
// Report
// ============================================================================

#[test]
fn test_report_quarter_size() {
    let report = Report::new("x", 1000, &[(Strategy::Rle, 250)]).unwrap();
    let row = report.row(Strategy::Rle).unwrap();
    assert_eq!(row.space_savings_text(), "75.0000");
    assert_eq!(row.compression_ratio_text(), "4.0000");
}

#[test]
fn test_report_negative_savings_preserved() {
    assert_eq!(space_savings(100, 150), Ok(-50.0));
    let report = Report::new("x", 100, &[(Strategy::DeltaRle, 150)]).unwrap();
    let row = report.row(Strategy::DeltaRle).unwrap();
    assert_eq!(row.space_savings_text(), "-50.0000");
    assert_eq!(row.compression_ratio_text(), "0.6667");
}

#[test]
fn test_report_no_data() {
    assert_eq!(space_savings(0, 10), Err(ReportError::NoData));
    assert_eq!(compression_ratio(0, 10), Err(ReportError::NoData));
    assert_eq!(Report::new("x", 0, &[(Strategy::Rle, 3)]), Err(ReportError::NoData));
}

#[test]
fn test_report_empty_artifact() {
    assert!(matches!(compression_ratio(10, 0), Err(ReportError::EmptyArtifact { .. })));
    assert_eq!(
        Report::new("x", 10, &[(Strategy::Rle, 0)]),
        Err(ReportError::EmptyArtifact { label: "Run Length Encoded".to_string() })
    );
}

#[test]
fn test_report_text_layout() {
    let report = Report::new("station.txt", 1000, &[(Strategy::Raw, 1000), (Strategy::Rle, 250)]).unwrap();
    let text = report.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "======================================");
    assert_eq!(lines[1], "FILENAME: station.txt");
    assert_eq!(
        lines[2],
        "Raw Number Bytes              : 1000\tSpace Savings: 0.0000\tCompression Ratio: 1.0000"
    );
    assert_eq!(
        lines[3],
        "Run Length Encoded            : 250\tSpace Savings: 75.0000\tCompression Ratio: 4.0000"
    );
    assert_eq!(lines[4], "NOTE: Percent Compression < 0 means encoded file is larger than original file");
    assert_eq!(lines[5], "======================================");
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_read_samples() {
    let text = "\
725030 20240101 -10.0 x
725030 20240101 999.0 x

725030 20240101 abc x
725030 20240101
725030 20240101 -999 x
725030 20240101 -10.1 x
";
    let (samples, stats) = read_samples(Cursor::new(text), 2).unwrap();
    assert_eq!(samples, vec![-10.0, -10.1]);
    assert_eq!(stats.lines, 7);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.out_of_range, 2);
}

#[test]
fn test_read_samples_other_column() {
    let (samples, _) = read_samples(Cursor::new("1.5\n2.5 9\n"), 0).unwrap();
    assert_eq!(samples, vec![1.5, 2.5]);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_pipeline_worked_example() {
    let encoded = pipeline::encode_samples(&NIGHT, false).unwrap();

    assert_eq!(encoded.quantized, vec![2978, 2978, 2968, 2959, 2959, 2959]);
    assert_eq!(encoded.delta, vec![-2978, 0, 10, 9, 0, 0]);
    assert_eq!(encoded.double_delta, vec![2978, -2978, -10, 1, 9, 0]);
    assert_eq!(
        encoded.delta_rle.runs,
        vec![Run::new(1, -2978), Run::new(1, 0), Run::new(1, 10), Run::new(1, 9), Run::new(2, 0)]
    );

    assert_eq!(
        encoded.sizes(),
        [
            (Strategy::Raw, 12),
            (Strategy::Rle, 9),
            (Strategy::DeltaRle, 7),
            (Strategy::DeltaDeltaRle, 10),
        ]
    );

    let report = encoded.report("night").unwrap();
    let texts: Vec<(String, String)> = report
        .rows()
        .iter()
        .map(|r| (r.space_savings_text(), r.compression_ratio_text()))
        .collect();
    assert_eq!(
        texts,
        vec![
            ("0.0000".to_string(), "1.0000".to_string()),
            ("25.0000".to_string(), "1.3333".to_string()),
            ("41.6667".to_string(), "1.7143".to_string()),
            ("16.6667".to_string(), "1.2000".to_string()),
        ]
    );
}

#[test]
fn test_pipeline_parallel_matches_sequential() {
    let readings: Vec<f64> = (0..500).map(|i| -20.0 + f64::from(i % 37) * 0.1).collect();
    let sequential = pipeline::encode_samples(&readings, false).unwrap();
    let parallel = pipeline::encode_samples(&readings, true).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_pipeline_fault_values_never_quantized() {
    let encoded = pipeline::encode_samples(&[999.0, -10.0, -999.0, -10.0], true).unwrap();
    assert_eq!(encoded.quantized, vec![2978, 2978]);
}

#[test]
fn test_pipeline_empty_is_no_data() {
    let encoded = pipeline::encode_samples(&[999.0, -999.0], true).unwrap();
    assert_eq!(encoded, Encoded::default());
    assert_eq!(encoded.report("empty"), Err(ReportError::NoData));
}

#[test]
fn test_pipeline_warm_series() {
    let encoded = pipeline::encode_samples(&[20.0, 20.0, 20.1, 20.1, 20.2], false).unwrap();

    assert_eq!(encoded.quantized, vec![5957, 5957, 5967, 5967, 5977]);
    assert_eq!(encoded.delta, vec![-5957, 0, -10, 0, -10]);
    assert_eq!(encoded.double_delta, vec![5957, -5957, 10, -10, 10]);
    assert_eq!(encoded.delta_rle.bytes, vec![0x9B, 0xC5, 0x0E, 0x00, 0x16, 0x00, 0x16]);
    assert_eq!(
        encoded.sizes(),
        [
            (Strategy::Raw, 10),
            (Strategy::Rle, 9),
            (Strategy::DeltaRle, 7),
            (Strategy::DeltaDeltaRle, 9),
        ]
    );

    let report = encoded.report("warm").unwrap();
    let delta = report.row(Strategy::DeltaRle).unwrap();
    assert_eq!(delta.space_savings_text(), "30.0000");
    assert_eq!(delta.compression_ratio_text(), "1.4286");
}

#[test]
fn test_pipeline_extreme_swings_pack() {
    // Largest possible jumps between 14-bit codes still fit the packed payload
    let encoded = pipeline::encode(vec![SAMPLE_MAX, 0, SAMPLE_MAX, 0], false).unwrap();
    assert_eq!(encoded.delta, vec![-16383, 16383, -16383, 16383]);
    assert_eq!(encoded.double_delta, vec![16383, -32766, 32766, -32766]);
    for (artifact, bytes) in [
        (Artifact::DeltaRle, &encoded.delta_rle.bytes),
        (Artifact::DoubleDeltaRle, &encoded.double_delta_rle.bytes),
    ] {
        assert_eq!(bytes.len(), 12, "{artifact:?}");
        assert_eq!(artifacts::reconstruct(artifact, bytes).unwrap(), Some(encoded.quantized.clone()));
    }
}

#[test]
fn test_reconstruct_every_artifact() {
    let encoded = pipeline::encode_samples(&NIGHT, true).unwrap();
    for (artifact, bytes) in [
        (Artifact::Quantized, &encoded.baseline),
        (Artifact::Rle, &encoded.direct.bytes),
        (Artifact::DeltaRle, &encoded.delta_rle.bytes),
        (Artifact::DoubleDeltaRle, &encoded.double_delta_rle.bytes),
    ] {
        let codes = artifacts::reconstruct(artifact, bytes).unwrap();
        assert_eq!(codes.as_ref(), Some(&encoded.quantized), "{artifact:?}");
    }
    assert_eq!(artifacts::reconstruct(Artifact::Delta, &[]), Ok(None));
}

#[test]
fn test_reconstruct_out_of_range() {
    // a leading delta of +1 reconstructs to code -1
    let bytes = Packed::encode(&[Run::new(1, 1)]).unwrap();
    assert_eq!(
        artifacts::reconstruct(Artifact::DeltaRle, &bytes),
        Err(DecodeError::SampleOutOfRange { index: 0, value: -1 })
    );
}

#[test]
fn test_serialized_artifacts_match_has_binary() {
    let encoded = pipeline::encode_samples(&NIGHT, false).unwrap();
    for &artifact in Artifact::value_variants() {
        assert_eq!(artifact.serialized(&encoded).is_some(), artifact.has_binary(), "{artifact:?}");
    }
    assert_eq!(Artifact::DeltaRle.serialized(&encoded), Some(encoded.delta_rle.bytes.as_slice()));
}

#[test]
fn test_artifact_from_path() {
    assert_eq!(Artifact::from_path(Path::new("out/station.drle.bin")), Some(Artifact::DeltaRle));
    assert_eq!(Artifact::from_path(Path::new("station.data")), Some(Artifact::Quantized));
    assert_eq!(Artifact::from_path(Path::new("station.dd")), Some(Artifact::DoubleDelta));
    assert_eq!(Artifact::from_path(Path::new("station.csv")), None);
    assert_eq!(Artifact::from_path(Path::new("station")), None);
}

#[test]
fn test_text_writers() {
    let mut out = Vec::new();
    artifacts::write_runs(&mut out, &[Run::new(2, 2978), Run::new(1, -10)]).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "2 2978\n1 -10\n");

    let mut out = Vec::new();
    artifacts::write_values(&mut out, &[-2978, 0]).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "-2978\n0\n");
}
