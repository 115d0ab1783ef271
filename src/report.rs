//! Size accounting: space savings and compression ratio per strategy.

use std::fmt;

use serde::Serialize;

use crate::error::ReportError;

/// Encoding strategies compared by the report, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Quantized codes as 16-bit registers (the baseline itself)
    Raw,
    /// Run-length encoding of the codes
    Rle,
    /// Delta pass, then run-length encoding
    DeltaRle,
    /// Two delta passes, then run-length encoding
    DeltaDeltaRle,
}

impl Strategy {
    /// All strategies in report order
    pub const ALL: [Self; 4] = [Self::Raw, Self::Rle, Self::DeltaRle, Self::DeltaDeltaRle];

    /// Human-readable row label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raw => "Raw Number Bytes",
            Self::Rle => "Run Length Encoded",
            Self::DeltaRle => "Delta Run Length Encoded",
            Self::DeltaDeltaRle => "Delta Delta Run Length Encoded",
        }
    }
}

/// `(1 - encoded / baseline) * 100`; negative when the encoding expanded the data
///
/// # Errors
/// Returns [`ReportError::NoData`] when `baseline` is zero.
pub fn space_savings(baseline: usize, encoded: usize) -> Result<f64, ReportError> {
    if baseline == 0 {
        return Err(ReportError::NoData);
    }
    Ok((1.0 - encoded as f64 / baseline as f64) * 100.0)
}

/// `baseline / encoded`
///
/// # Errors
/// Returns [`ReportError::NoData`] when `baseline` is zero and
/// [`ReportError::EmptyArtifact`] when `encoded` is zero.
pub fn compression_ratio(baseline: usize, encoded: usize) -> Result<f64, ReportError> {
    if baseline == 0 {
        return Err(ReportError::NoData);
    }
    if encoded == 0 {
        return Err(ReportError::EmptyArtifact { label: "encoded".to_string() });
    }
    Ok(baseline as f64 / encoded as f64)
}

/// One report row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    strategy: Strategy,
    encoded_bytes: usize,
    space_savings: f64,
    compression_ratio: f64,
}

impl ReportRow {
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn encoded_bytes(&self) -> usize {
        self.encoded_bytes
    }

    #[must_use]
    pub const fn space_savings(&self) -> f64 {
        self.space_savings
    }

    #[must_use]
    pub const fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    /// Savings rendered to four decimals
    #[must_use]
    pub fn space_savings_text(&self) -> String {
        format!("{:.4}", self.space_savings)
    }

    /// Ratio rendered to four decimals
    #[must_use]
    pub fn compression_ratio_text(&self) -> String {
        format!("{:.4}", self.compression_ratio)
    }
}

/// Compression report for one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    title: String,
    baseline_bytes: usize,
    rows: Vec<ReportRow>,
}

impl Report {
    /// Build a report from the baseline size and each strategy's encoded size
    ///
    /// # Errors
    /// Returns [`ReportError::NoData`] for an empty baseline and
    /// [`ReportError::EmptyArtifact`] for a zero-byte artifact.
    pub fn new(
        title: impl Into<String>,
        baseline_bytes: usize,
        sizes: &[(Strategy, usize)],
    ) -> Result<Self, ReportError> {
        if baseline_bytes == 0 {
            return Err(ReportError::NoData);
        }
        let mut rows = Vec::with_capacity(sizes.len());
        for &(strategy, encoded_bytes) in sizes {
            if encoded_bytes == 0 {
                return Err(ReportError::EmptyArtifact { label: strategy.label().to_string() });
            }
            rows.push(ReportRow {
                strategy,
                encoded_bytes,
                space_savings: space_savings(baseline_bytes, encoded_bytes)?,
                compression_ratio: compression_ratio(baseline_bytes, encoded_bytes)?,
            });
        }

        Ok(Self { title: title.into(), baseline_bytes, rows })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn baseline_bytes(&self) -> usize {
        self.baseline_bytes
    }

    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Row for `strategy`, if the report has one
    #[must_use]
    pub fn row(&self, strategy: Strategy) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.strategy == strategy)
    }
}

const RULE: &str = "======================================";

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "FILENAME: {}", self.title)?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<30}: {}\tSpace Savings: {}\tCompression Ratio: {}",
                row.strategy.label(),
                row.encoded_bytes,
                row.space_savings_text(),
                row.compression_ratio_text()
            )?;
        }
        writeln!(f, "NOTE: Percent Compression < 0 means encoded file is larger than original file")?;
        writeln!(f, "{RULE}")
    }
}
