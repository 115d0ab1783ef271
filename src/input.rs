//! Reading raw measurements out of whitespace-separated station files.

use std::io::BufRead;

use log::debug;
use serde::Serialize;

use crate::quantize::is_valid;

/// Column holding the temperature in NOAA-style station exports
pub const DEFAULT_COLUMN: usize = 2;

/// Line accounting for one input pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputStats {
    /// Lines read, including blank and skipped ones
    pub lines: usize,
    /// Readings forwarded to the quantizer
    pub accepted: usize,
    /// Lines whose column was missing or not a number
    pub skipped: usize,
    /// Readings outside `[-100, 100]` (fault sentinels)
    pub out_of_range: usize,
}

/// Read the measurement column of every line, keeping only valid readings
///
/// Blank lines, lines without `column`, and non-numeric fields are skipped.
/// Fault readings outside `[-100, 100]` are dropped.
///
/// # Errors
/// Returns the underlying I/O error if a line cannot be read.
pub fn read_samples<R: BufRead>(reader: R, column: usize) -> std::io::Result<(Vec<f64>, InputStats)> {
    let mut stats = InputStats::default();
    let mut samples = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        stats.lines += 1;

        let field = line.split_whitespace().nth(column);
        let Some(value) = field.and_then(|f| f.parse::<f64>().ok()) else {
            if !line.trim().is_empty() {
                debug!("line {}: no numeric value in column {column}, skipped", line_num + 1);
            }
            stats.skipped += 1;
            continue;
        };

        if !is_valid(value) {
            stats.out_of_range += 1;
            continue;
        }

        stats.accepted += 1;
        samples.push(value);
    }

    Ok((samples, stats))
}
