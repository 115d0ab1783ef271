//! Binary layouts for quantized samples and run-length records.
//!
//! Two record layouts exist, selected at compile time through the sealed
//! [`RunLayout`] trait:
//!
//! | Layout | Pass | Record bytes | Count field | Value field |
//! |--------|------|--------------|-------------|-------------|
//! | [`Direct`] | raw codes | 3 | `u8` (1-255) | big-endian `u16` |
//! | [`Packed`] | delta / double delta | 1 to 3 | 2 bits (1-4) | 5, 12 or 16 bit signed |
//!
//! The packed first byte is `C NN VVVVV`: `C` is the continuation flag, `NN`
//! holds `count - 1`, `VVVVV` the low five bits of the value. With `C` set a
//! second byte `C VVVVVVV` carries value bits 5-11, and with its own `C` set a
//! third byte `0000 VVVV` carries bits 12-15. Every delta and double delta of
//! 14-bit codes fits the 16-bit payload.

use std::num::NonZeroU8;

use crate::constants::{
    sign_extend, BASELINE_BYTES_PER_SAMPLE, DELTA_MAX_RUN, DIRECT_MAX_RUN, DIRECT_RECORD_BYTES,
    PACKED_CONTINUATION, PACKED_COUNT_MASK, PACKED_COUNT_SHIFT, PACKED_ESCAPE_BITS, PACKED_ESCAPE_MAX,
    PACKED_ESCAPE_MIN, PACKED_HIGH_MASK, PACKED_INLINE_MAX, PACKED_INLINE_MIN, PACKED_LOW_BITS,
    PACKED_LOW_MASK, PACKED_MID_BITS, PACKED_MID_MASK, PACKED_PAYLOAD_BITS, PACKED_PAYLOAD_MAX,
    PACKED_PAYLOAD_MIN,
    RESERVED_BITS, SAMPLE_BITS, SAMPLE_MAX,
};
use crate::error::{DecodeError, PackError};
use crate::quantize::{from_container, to_container};
use crate::rle::Run;

/// Private module to seal the trait - only the layouts below exist
mod private {
    pub trait Sealed {}

    impl Sealed for super::Direct {}
    impl Sealed for super::Packed {}
}

/// A byte layout for run-length records.
pub trait RunLayout: private::Sealed {
    /// Short name used in logs and errors
    const NAME: &'static str;

    /// Longest run a single record can carry
    const MAX_RUN: NonZeroU8;

    /// Bytes `run` occupies once serialized
    ///
    /// # Errors
    /// Fails exactly when [`RunLayout::write_run`] would fail.
    fn encoded_len(run: &Run) -> Result<usize, PackError>;

    /// Append one serialized record to `out`
    ///
    /// # Errors
    /// Returns [`PackError`] if the count or value does not fit the layout.
    /// Nothing is written on error.
    fn write_run(run: &Run, out: &mut Vec<u8>) -> Result<(), PackError>;

    /// Parse one record starting at `offset`, returning it and its length
    ///
    /// # Errors
    /// Returns [`DecodeError`] on truncated or invalid input.
    fn read_run(buf: &[u8], offset: usize) -> Result<(Run, usize), DecodeError>;

    /// Serialize a whole run sequence
    ///
    /// # Errors
    /// Returns the first [`PackError`] encountered.
    fn encode(runs: &[Run]) -> Result<Vec<u8>, PackError> {
        let mut out = Vec::with_capacity(runs.len() * 2);
        for run in runs {
            Self::write_run(run, &mut out)?;
        }
        Ok(out)
    }

    /// Parse a whole byte stream back into runs
    ///
    /// # Errors
    /// Returns the first [`DecodeError`] encountered.
    fn decode(buf: &[u8]) -> Result<Vec<Run>, DecodeError> {
        let mut runs = Vec::new();
        let mut offset = 0;
        while offset < buf.len() {
            let (run, len) = Self::read_run(buf, offset)?;
            runs.push(run);
            offset += len;
        }
        Ok(runs)
    }

    /// Total serialized size of `runs` without materializing the bytes
    ///
    /// # Errors
    /// Returns the first [`PackError`] encountered.
    fn size(runs: &[Run]) -> Result<usize, PackError> {
        runs.iter().map(Self::encoded_len).sum()
    }
}

/// 3-byte layout of the raw pass: count byte, then the code as big-endian `u16`
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

/// 1-to-3-byte layout of the delta passes
#[derive(Debug, Clone, Copy, Default)]
pub struct Packed;

impl RunLayout for Direct {
    const NAME: &'static str = "direct";
    const MAX_RUN: NonZeroU8 = DIRECT_MAX_RUN;

    #[inline]
    fn encoded_len(run: &Run) -> Result<usize, PackError> {
        check_direct(run)?;
        Ok(DIRECT_RECORD_BYTES)
    }

    fn write_run(run: &Run, out: &mut Vec<u8>) -> Result<(), PackError> {
        let value = check_direct(run)?;
        out.push(run.count);
        out.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn read_run(buf: &[u8], offset: usize) -> Result<(Run, usize), DecodeError> {
        let Some(bytes) = buf.get(offset..offset + DIRECT_RECORD_BYTES) else {
            return Err(DecodeError::Truncated { offset, needed: offset + DIRECT_RECORD_BYTES - buf.len() });
        };
        if bytes[0] == 0 {
            return Err(DecodeError::ZeroCount { offset });
        }
        let value = u16::from_be_bytes([bytes[1], bytes[2]]);
        Ok((Run::new(bytes[0], i32::from(value)), DIRECT_RECORD_BYTES))
    }
}

#[inline]
fn check_direct(run: &Run) -> Result<u16, PackError> {
    if run.count == 0 {
        return Err(PackError::CountOutOfRange { count: 0, max: DIRECT_MAX_RUN.get() });
    }
    u16::try_from(run.value).map_err(|_| PackError::PayloadOverflow { value: run.value, bits: 16 })
}

impl RunLayout for Packed {
    const NAME: &'static str = "packed";
    const MAX_RUN: NonZeroU8 = DELTA_MAX_RUN;

    #[inline]
    fn encoded_len(run: &Run) -> Result<usize, PackError> {
        check_packed(run)
    }

    fn write_run(run: &Run, out: &mut Vec<u8>) -> Result<(), PackError> {
        let len = check_packed(run)?;
        let raw = run.value as u32;
        let head = ((run.count - 1) << PACKED_COUNT_SHIFT) | (raw as u8 & PACKED_LOW_MASK);
        if len == 1 {
            out.push(head);
            return Ok(());
        }

        out.push(PACKED_CONTINUATION | head);
        let mid = (raw >> PACKED_LOW_BITS) as u8 & PACKED_MID_MASK;
        if len == 2 {
            out.push(mid);
        } else {
            out.push(PACKED_CONTINUATION | mid);
            out.push((raw >> PACKED_ESCAPE_BITS) as u8 & PACKED_HIGH_MASK);
        }
        Ok(())
    }

    fn read_run(buf: &[u8], offset: usize) -> Result<(Run, usize), DecodeError> {
        let head = *buf.get(offset).ok_or(DecodeError::Truncated { offset, needed: 1 })?;
        let count = ((head >> PACKED_COUNT_SHIFT) & PACKED_COUNT_MASK) + 1;
        let low = u32::from(head & PACKED_LOW_MASK);

        if head & PACKED_CONTINUATION == 0 {
            return Ok((Run::new(count, sign_extend(low, PACKED_LOW_BITS)), 1));
        }

        let mid = *buf.get(offset + 1).ok_or(DecodeError::Truncated { offset, needed: 1 })?;
        let raw = (u32::from(mid & PACKED_MID_MASK) << PACKED_LOW_BITS) | low;
        if mid & PACKED_CONTINUATION == 0 {
            return Ok((Run::new(count, sign_extend(raw, PACKED_ESCAPE_BITS)), 2));
        }

        let high = *buf.get(offset + 2).ok_or(DecodeError::Truncated { offset, needed: 1 })?;
        if high & !PACKED_HIGH_MASK != 0 {
            return Err(DecodeError::ExtraBits { offset: offset + 2, raw: high });
        }
        let raw = (u32::from(high) << PACKED_ESCAPE_BITS) | raw;
        Ok((Run::new(count, sign_extend(raw, PACKED_PAYLOAD_BITS)), 3))
    }
}

/// Validate a packed record and return its serialized length
#[inline]
fn check_packed(run: &Run) -> Result<usize, PackError> {
    if run.count == 0 || run.count > DELTA_MAX_RUN.get() {
        return Err(PackError::CountOutOfRange { count: run.count, max: DELTA_MAX_RUN.get() });
    }
    match run.value {
        PACKED_INLINE_MIN..=PACKED_INLINE_MAX => Ok(1),
        PACKED_ESCAPE_MIN..=PACKED_ESCAPE_MAX => Ok(2),
        PACKED_PAYLOAD_MIN..=PACKED_PAYLOAD_MAX => Ok(3),
        value => Err(PackError::PayloadOverflow { value, bits: PACKED_PAYLOAD_BITS }),
    }
}

/// Serialize quantized codes as left-justified big-endian 16-bit registers
///
/// # Errors
/// Returns [`PackError::PayloadOverflow`] for a code wider than 14 bits.
pub fn encode_baseline(samples: &[u16]) -> Result<Vec<u8>, PackError> {
    let mut out = Vec::with_capacity(samples.len() * BASELINE_BYTES_PER_SAMPLE);
    for &q in samples {
        if q > SAMPLE_MAX {
            return Err(PackError::PayloadOverflow { value: i32::from(q), bits: SAMPLE_BITS });
        }
        out.extend_from_slice(&to_container(q).to_be_bytes());
    }
    Ok(out)
}

/// Parse a baseline stream back into quantized codes
///
/// # Errors
/// Returns [`DecodeError::Truncated`] for an odd-length stream and
/// [`DecodeError::ReservedBits`] when a register has its low bits set.
pub fn decode_baseline(buf: &[u8]) -> Result<Vec<u16>, DecodeError> {
    let chunks = buf.chunks_exact(BASELINE_BYTES_PER_SAMPLE);
    if !chunks.remainder().is_empty() {
        return Err(DecodeError::Truncated { offset: buf.len() - 1, needed: 1 });
    }
    chunks
        .enumerate()
        .map(|(i, pair)| {
            let raw = u16::from_be_bytes([pair[0], pair[1]]);
            if raw & ((1 << RESERVED_BITS) - 1) != 0 {
                return Err(DecodeError::ReservedBits { offset: i * BASELINE_BYTES_PER_SAMPLE, raw });
            }
            Ok(from_container(raw))
        })
        .collect()
}

/// Size in bytes of the quantized baseline for `samples` codes
#[inline]
#[must_use]
pub const fn baseline_size(samples: usize) -> usize {
    samples * BASELINE_BYTES_PER_SAMPLE
}
