//! End-to-end orchestration: read, quantize, transform, run-length encode, report.
//!
//! ```text
//! raw ─▶ quantize ─┬──────────────────────────▶ rle(255) ─▶ Direct  ─▶ .rle
//!                  └─▶ delta ─┬───────────────▶ rle(4)   ─▶ Packed  ─▶ .drle
//!                             └─▶ delta ──────▶ rle(4)   ─▶ Packed  ─▶ .ddrle
//! ```
//!
//! The three run-length branches only read the shared, immutable code and
//! delta slices, so they run on scoped threads when [`Config::parallel`] is set.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::artifacts;
use crate::delta;
use crate::error::{PackError, PipelineError};
use crate::format::{encode_baseline, Direct, Packed, RunLayout};
use crate::input::{self, InputStats, DEFAULT_COLUMN};
use crate::quantize::quantize_all;
use crate::report::{Report, Strategy};
use crate::rle::{self, Run};

/// Typed configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Station file to read
    pub input: PathBuf,
    /// Zero-based whitespace column holding the measurement
    pub column: usize,
    /// Report title; defaults to the input path
    pub title: Option<String>,
    /// Directory receiving intermediate artifacts, if any
    pub artifacts_dir: Option<PathBuf>,
    /// Write the plain-text artifacts (`.data`, `.rle`, `.d`, ...)
    pub text_artifacts: bool,
    /// Write the serialized artifacts (`.data.bin`, `.rle.bin`, ...)
    pub binary_artifacts: bool,
    /// Run the three encoding branches concurrently
    pub parallel: bool,
}

impl Config {
    /// Configuration with defaults for everything but the input path
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            column: DEFAULT_COLUMN,
            title: None,
            artifacts_dir: None,
            text_artifacts: true,
            binary_artifacts: true,
            parallel: true,
        }
    }

    /// Title used in the report header
    #[must_use]
    pub fn report_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.input.display().to_string())
    }

    /// File stem shared by every artifact of this input
    #[must_use]
    pub fn artifact_stem(&self) -> String {
        self.input
            .file_stem()
            .map_or_else(|| "samples".to_string(), |s| s.to_string_lossy().into_owned())
    }
}

/// One run-length pass: its records and their serialized form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pass {
    /// Run-length records of the pass
    pub runs: Vec<Run>,
    /// The records serialized in the pass's layout
    pub bytes: Vec<u8>,
}

impl Pass {
    fn build<L: RunLayout>(values: &[i32]) -> Result<Self, PackError> {
        let runs = rle::encode(values, L::MAX_RUN);
        let bytes = L::encode(&runs)?;
        debug!("{} pass: {} values -> {} runs, {} bytes", L::NAME, values.len(), runs.len(), bytes.len());
        Ok(Self { runs, bytes })
    }
}

/// Every stream derived from one quantized input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    /// Quantized 14-bit codes
    pub quantized: Vec<u16>,
    /// Serialized baseline (16-bit registers)
    pub baseline: Vec<u8>,
    /// First delta pass over the codes
    pub delta: Vec<i32>,
    /// Second delta pass
    pub double_delta: Vec<i32>,
    /// Run-length pass over the codes, direct layout
    pub direct: Pass,
    /// Run-length pass over `delta`, packed layout
    pub delta_rle: Pass,
    /// Run-length pass over `double_delta`, packed layout
    pub double_delta_rle: Pass,
}

impl Encoded {
    /// Serialized size of the stream `strategy` produced
    #[must_use]
    pub fn encoded_len(&self, strategy: Strategy) -> usize {
        match strategy {
            Strategy::Raw => self.baseline.len(),
            Strategy::Rle => self.direct.bytes.len(),
            Strategy::DeltaRle => self.delta_rle.bytes.len(),
            Strategy::DeltaDeltaRle => self.double_delta_rle.bytes.len(),
        }
    }

    /// Encoded sizes in report order
    #[must_use]
    pub fn sizes(&self) -> [(Strategy, usize); 4] {
        Strategy::ALL.map(|strategy| (strategy, self.encoded_len(strategy)))
    }

    /// Compression report against the baseline
    ///
    /// # Errors
    /// Returns [`crate::ReportError::NoData`] when no sample survived filtering.
    pub fn report(&self, title: impl Into<String>) -> Result<Report, crate::ReportError> {
        Report::new(title, self.baseline.len(), &self.sizes())
    }
}

/// Run every encoding strategy over already-quantized codes
///
/// # Errors
/// Returns [`PipelineError::Pack`] if a stream does not fit its layout.
pub fn encode(quantized: Vec<u16>, parallel: bool) -> Result<Encoded, PipelineError> {
    let baseline = encode_baseline(&quantized).map_err(|source| PipelineError::Pack { artifact: "quantized", source })?;
    let codes = delta::widen(&quantized);
    let delta = delta::encode(&codes);
    let double_delta = delta::encode(&delta);

    let (direct, delta_rle, double_delta_rle) = if parallel {
        thread::scope(|s| {
            let direct = s.spawn(|| Pass::build::<Direct>(&codes));
            let delta_rle = s.spawn(|| Pass::build::<Packed>(&delta));
            let double_delta_rle = Pass::build::<Packed>(&double_delta);
            (join(direct), join(delta_rle), double_delta_rle)
        })
    } else {
        (
            Pass::build::<Direct>(&codes),
            Pass::build::<Packed>(&delta),
            Pass::build::<Packed>(&double_delta),
        )
    };

    Ok(Encoded {
        quantized,
        baseline,
        delta,
        double_delta,
        direct: direct.map_err(|source| PipelineError::Pack { artifact: "rle", source })?,
        delta_rle: delta_rle.map_err(|source| PipelineError::Pack { artifact: "delta rle", source })?,
        double_delta_rle: double_delta_rle
            .map_err(|source| PipelineError::Pack { artifact: "double delta rle", source })?,
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

/// Drop fault readings, quantize, and run every encoding strategy
///
/// # Errors
/// Returns [`PipelineError::Pack`] if a stream does not fit its layout.
pub fn encode_samples(raw: &[f64], parallel: bool) -> Result<Encoded, PipelineError> {
    encode(quantize_all(raw.iter().copied()), parallel)
}

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub stats: InputStats,
    pub encoded: Encoded,
    pub report: Report,
    /// Artifact files written, in creation order
    pub written: Vec<PathBuf>,
}

/// Read `config.input`, encode it, write artifacts, and build the report
///
/// # Errors
/// Fails on I/O errors, on a stream that overflows its layout, and with
/// [`crate::ReportError::NoData`] when no valid sample was read.
pub fn run(config: &Config) -> Result<Outcome, PipelineError> {
    let (samples, stats) = read_input(&config.input, config.column)?;
    info!(
        "{}: {} lines, {} samples, {} skipped, {} out of range",
        config.input.display(),
        stats.lines,
        stats.accepted,
        stats.skipped,
        stats.out_of_range
    );
    if samples.is_empty() {
        warn!("{}: no valid samples in column {}", config.input.display(), config.column);
    }

    let encoded = encode_samples(&samples, config.parallel)?;
    for (strategy, size) in encoded.sizes() {
        info!("{}: {size} bytes", strategy.label());
    }

    let report = encoded.report(config.report_title())?;

    let mut written = Vec::new();
    if let Some(dir) = &config.artifacts_dir {
        let stem = config.artifact_stem();
        if config.text_artifacts {
            written.extend(artifacts::write_text(dir, &stem, &encoded)?);
        }
        if config.binary_artifacts {
            written.extend(artifacts::write_binary(dir, &stem, &encoded)?);
        }
        info!("wrote {} artifacts to {}", written.len(), dir.display());
    }

    Ok(Outcome { stats, encoded, report, written })
}

fn read_input(path: &Path, column: usize) -> Result<(Vec<f64>, InputStats), PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    input::read_samples(BufReader::new(file), column).map_err(|e| PipelineError::io(path, e))
}
