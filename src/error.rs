//! Error types for deltarun encoding, decoding and reporting.

use std::fmt;
use std::io;

/// Error returned when a run cannot be serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// Value does not fit the layout's payload width
    PayloadOverflow { value: i32, bits: u32 },
    /// Count does not fit the layout's count field
    CountOutOfRange { count: u8, max: u8 },
}

/// Error returned when a byte stream cannot be parsed back into runs or samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Stream ended in the middle of a record
    Truncated { offset: usize, needed: usize },
    /// Direct record carries a zero count
    ZeroCount { offset: usize },
    /// Baseline container has its reserved low bits set
    ReservedBits { offset: usize, raw: u16 },
    /// Third packed byte sets bits above the 16-bit payload
    ExtraBits { offset: usize, raw: u8 },
    /// Reconstructed sample falls outside the 14-bit code range
    SampleOutOfRange { index: usize, value: i32 },
}

/// Error returned when a compression report cannot be computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The quantized baseline is empty, so savings and ratio are undefined
    NoData,
    /// An artifact has zero bytes, so its ratio is undefined
    EmptyArtifact { label: String },
}

/// Error returned by the end-to-end pipeline
#[derive(Debug)]
pub enum PipelineError {
    /// Reading input or writing an artifact failed
    Io { path: String, source: io::Error },
    /// A stream could not be serialized
    Pack { artifact: &'static str, source: PackError },
    /// The report could not be computed
    Report(ReportError),
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadOverflow { value, bits } => {
                write!(f, "value {value} does not fit a {bits}-bit payload")
            }
            Self::CountOutOfRange { count, max } => {
                write!(f, "run count {count} outside the encodable range 1..={max}")
            }
        }
    }
}

impl std::error::Error for PackError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset, needed } => {
                write!(f, "stream truncated at byte {offset}: record needs {needed} more byte(s)")
            }
            Self::ZeroCount { offset } => write!(f, "record at byte {offset} has a zero run count"),
            Self::ReservedBits { offset, raw } => {
                write!(f, "sample at byte {offset} has reserved low bits set (0x{raw:04x})")
            }
            Self::ExtraBits { offset, raw } => {
                write!(f, "byte {offset} sets bits above the packed payload (0x{raw:02x})")
            }
            Self::SampleOutOfRange { index, value } => {
                write!(f, "reconstructed sample {index} is {value}, outside the 14-bit code range")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no data: the quantized baseline is empty"),
            Self::EmptyArtifact { label } => write!(f, "artifact '{label}' is empty"),
        }
    }
}

impl std::error::Error for ReportError {}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{path}: {source}"),
            Self::Pack { artifact, source } => write!(f, "cannot serialize {artifact} stream: {source}"),
            Self::Report(e) => write!(f, "cannot build report: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Pack { source, .. } => Some(source),
            Self::Report(e) => Some(e),
        }
    }
}

impl From<ReportError> for PipelineError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

impl PipelineError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        Self::Io { path: path.as_ref().display().to_string(), source }
    }
}
