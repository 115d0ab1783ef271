//! `deltarun` - Fixed-point sensor streams compressed three ways
//!
//! Converts slow-changing sensor readings (temperature from environmental
//! stations, typically) into 14-bit fixed-point codes and measures how much
//! redundancy three run-length strategies remove:
//!
//! - **RLE**: run-length encoding of the codes themselves
//! - **Delta RLE**: run-length encoding of `previous - current`
//! - **Double delta RLE**: the same after a second delta pass
//!
//! Every strategy is lossless with respect to the codes: they are exactly
//! recoverable from any of the serialized streams. Quantization itself is not.
//! Readings between -100 and -40 are clamped to code 0 (the bottom of the
//! sensor range), so those readings cannot be told apart once quantized.
//!
//! # Example
//! ```
//! use deltarun::{pipeline, Strategy};
//!
//! // A cold night, with one fault sentinel the station emitted
//! let readings = [-10.0, -10.0, -10.1, 999.0, -10.2, -10.2, -10.2];
//!
//! let encoded = pipeline::encode_samples(&readings, false).unwrap();
//! assert_eq!(encoded.quantized.len(), 6);
//!
//! let report = encoded.report("night.txt").unwrap();
//! let delta = report.row(Strategy::DeltaRle).unwrap();
//! println!("delta rle: {} bytes, ratio {}", delta.encoded_bytes(), delta.compression_ratio_text());
//! ```
//!
//! # Fixed-Point Codes
//!
//! `q = floor((v + 40) / 165 * 65536) >> 2`, the register layout of a sensor
//! with a `[-40, 125]` range: 14 significant bits stored left-justified in a
//! 16-bit word whose two low bits are always zero. Readings outside
//! `[-100, 100]` are fault sentinels (999 / -999) and are dropped before
//! quantization.
//!
//! # Delta Transform
//!
//! `d[0] = 0 - s[0]`, `d[i] = s[i-1] - s[i]`. Note the sign: previous minus
//! current. The inverse is `s[i] = s[i-1] - d[i]`.
//!
//! # Wire Formats
//!
//! ## Baseline
//!
//! Each code as its 16-bit register (`q << 2`), big-endian: 2 bytes per sample.
//!
//! ## Direct RLE (max run 255)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | run count (1-255) |
//! | 1 | 2 | code, big-endian |
//!
//! ## Packed RLE (delta passes, max run 4)
//!
//! | Bits | Field | Description |
//! |------|-------|-------------|
//! | 7 | `C` | 1 = a second byte follows |
//! | 6-5 | `NN` | run count minus one (1-4) |
//! | 4-0 | `VVVVV` | low five value bits, two's complement |
//!
//! Values in `-16..=15` take one byte. Values in `-2048..=2047` set `C` and
//! add a second byte: bit 7 is its own continuation flag, bits 6-0 carry
//! value bits 5-11. Values up to 16 bits set both flags and add a third byte
//! whose low nibble carries bits 12-15. Deltas of 14-bit codes stay within
//! `±16383` and double deltas within `±32766`, so every stream packs; wider
//! values are rejected with [`PackError::PayloadOverflow`] rather than truncated.
//!
//! # Report
//!
//! `space savings = (1 - encoded / baseline) * 100` and
//! `compression ratio = baseline / encoded`, both printed to four decimals.
//! Negative savings mean the strategy expanded the data.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

pub mod artifacts;
pub mod constants;
pub mod delta;
mod error;
pub mod format;
pub mod input;
pub mod pipeline;
pub mod quantize;
pub mod report;
pub mod rle;

#[cfg(test)]
mod tests;

// Re-export public API
pub use error::{DecodeError, PackError, PipelineError, ReportError};
pub use format::{Direct, Packed, RunLayout};
pub use pipeline::{Config, Encoded, Outcome};
pub use report::{Report, ReportRow, Strategy};
pub use rle::Run;
