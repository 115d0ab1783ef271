//! Intermediate artifacts: plain-text streams and their serialized counterparts.
//!
//! | Artifact | Text (`<stem>.<ext>`) | Binary (`<stem>.<ext>.bin`) |
//! |----------|-----------------------|-----------------------------|
//! | quantized codes | `.data`, one code per line | 16-bit registers |
//! | delta | `.d`, one delta per line | - |
//! | double delta | `.dd`, one delta per line | - |
//! | direct RLE | `.rle`, `count value` per line | [`Direct`] layout |
//! | delta RLE | `.drle`, `count value` per line | [`Packed`] layout |
//! | double delta RLE | `.ddrle`, `count value` per line | [`Packed`] layout |

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::constants::SAMPLE_MAX;
use crate::delta;
use crate::error::{DecodeError, PipelineError};
use crate::format::{decode_baseline, Direct, Packed, RunLayout};
use crate::pipeline::Encoded;
use crate::rle::{self, Run};

/// Streams persisted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Artifact {
    Quantized,
    Delta,
    DoubleDelta,
    Rle,
    DeltaRle,
    DoubleDeltaRle,
}

impl Artifact {
    /// File extension of the text form
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Quantized => "data",
            Self::Delta => "d",
            Self::DoubleDelta => "dd",
            Self::Rle => "rle",
            Self::DeltaRle => "drle",
            Self::DoubleDeltaRle => "ddrle",
        }
    }

    /// Whether the artifact has a serialized form
    #[must_use]
    pub const fn has_binary(self) -> bool {
        !matches!(self, Self::Delta | Self::DoubleDelta)
    }

    /// Serialized bytes of this artifact within `encoded`, if it has a binary form
    #[must_use]
    pub fn serialized(self, encoded: &Encoded) -> Option<&[u8]> {
        match self {
            Self::Quantized => Some(&encoded.baseline),
            Self::Rle => Some(&encoded.direct.bytes),
            Self::DeltaRle => Some(&encoded.delta_rle.bytes),
            Self::DoubleDeltaRle => Some(&encoded.double_delta_rle.bytes),
            Self::Delta | Self::DoubleDelta => None,
        }
    }

    /// Path of the text form inside `dir`
    #[must_use]
    pub fn text_path(self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension()))
    }

    /// Path of the serialized form inside `dir`
    #[must_use]
    pub fn binary_path(self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}.bin", self.extension()))
    }

    /// Guess the artifact from a file name such as `station.drle.bin`
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let name = name.strip_suffix(".bin").unwrap_or(name);
        let ext = name.rsplit_once('.')?.1;
        Self::value_variants().iter().copied().find(|a| a.extension() == ext)
    }
}

/// Write one value per line
///
/// # Errors
/// Returns the underlying I/O error.
pub fn write_values<W: Write, T: Display>(mut w: W, values: &[T]) -> io::Result<()> {
    for v in values {
        writeln!(w, "{v}")?;
    }
    w.flush()
}

/// Write one `count value` pair per line
///
/// # Errors
/// Returns the underlying I/O error.
pub fn write_runs<W: Write>(mut w: W, runs: &[Run]) -> io::Result<()> {
    for run in runs {
        writeln!(w, "{} {}", run.count, run.value)?;
    }
    w.flush()
}

fn create(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    File::create(path).map(BufWriter::new).map_err(|e| PipelineError::io(path, e))
}

/// Write every text artifact of `encoded` into `dir`, creating it if needed
///
/// # Errors
/// Returns [`PipelineError::Io`] naming the file that failed.
pub fn write_text(dir: &Path, stem: &str, encoded: &Encoded) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut written = Vec::with_capacity(6);

    let path = Artifact::Quantized.text_path(dir, stem);
    write_values(create(&path)?, &encoded.quantized).map_err(|e| PipelineError::io(&path, e))?;
    written.push(path);

    for (artifact, values) in [(Artifact::Delta, &encoded.delta), (Artifact::DoubleDelta, &encoded.double_delta)] {
        let path = artifact.text_path(dir, stem);
        write_values(create(&path)?, values).map_err(|e| PipelineError::io(&path, e))?;
        written.push(path);
    }

    for (artifact, pass) in [
        (Artifact::Rle, &encoded.direct),
        (Artifact::DeltaRle, &encoded.delta_rle),
        (Artifact::DoubleDeltaRle, &encoded.double_delta_rle),
    ] {
        let path = artifact.text_path(dir, stem);
        write_runs(create(&path)?, &pass.runs).map_err(|e| PipelineError::io(&path, e))?;
        written.push(path);
    }

    Ok(written)
}

/// Write every serialized artifact of `encoded` into `dir`, creating it if needed
///
/// # Errors
/// Returns [`PipelineError::Io`] naming the file that failed.
pub fn write_binary(dir: &Path, stem: &str, encoded: &Encoded) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    let mut written = Vec::with_capacity(4);
    for &artifact in Artifact::value_variants().iter().filter(|a| a.has_binary()) {
        let Some(bytes) = artifact.serialized(encoded) else {
            continue;
        };
        let path = artifact.binary_path(dir, stem);
        fs::write(&path, bytes).map_err(|e| PipelineError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

/// Decode a serialized artifact all the way back to quantized codes
///
/// Returns `Ok(None)` for artifacts without a serialized form.
///
/// # Errors
/// Returns [`DecodeError`] for a malformed stream or one that reconstructs
/// to values outside the 14-bit code range.
pub fn reconstruct(artifact: Artifact, bytes: &[u8]) -> Result<Option<Vec<u16>>, DecodeError> {
    let values = match artifact {
        Artifact::Quantized => return decode_baseline(bytes).map(Some),
        Artifact::Delta | Artifact::DoubleDelta => return Ok(None),
        Artifact::Rle => rle::decode(&Direct::decode(bytes)?),
        Artifact::DeltaRle => delta::decode(&rle::decode(&Packed::decode(bytes)?)),
        Artifact::DoubleDeltaRle => delta::decode(&delta::decode(&rle::decode(&Packed::decode(bytes)?))),
    };
    narrow(&values).map(Some)
}

fn narrow(values: &[i32]) -> Result<Vec<u16>, DecodeError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| match u16::try_from(value) {
            Ok(q) if q <= SAMPLE_MAX => Ok(q),
            _ => Err(DecodeError::SampleOutOfRange { index, value }),
        })
        .collect()
}
