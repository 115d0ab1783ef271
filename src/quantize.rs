//! Fixed-point quantization of raw readings into 14-bit sensor codes.

use crate::constants::{
    FULL_SCALE, RESERVED_BITS, SAMPLE_MAX, SENSOR_OFFSET, SENSOR_SPAN, VALID_MAX, VALID_MIN,
};

/// Check whether a raw reading is a plausible measurement
///
/// Readings outside `[-100, 100]` are fault sentinels (conventionally 999 / -999)
/// and must never reach [`quantize`]. NaN is rejected as well.
#[inline]
#[must_use]
pub fn is_valid(v: f64) -> bool {
    (VALID_MIN..=VALID_MAX).contains(&v)
}

/// Map a raw reading onto a 14-bit code
///
/// `floor((v + 40) / 165 * 65536) >> 2`. Truncation is part of the format and
/// must not be replaced with rounding. Results are saturated to `[0, 2^14 - 1]`:
/// every reading below -40 maps to 0, so the clamped part of `[-100, -40)`
/// cannot be recovered from the code.
#[inline]
#[must_use]
pub fn quantize(v: f64) -> u16 {
    let scaled = ((v + SENSOR_OFFSET) / SENSOR_SPAN * FULL_SCALE).floor();
    if scaled <= 0.0 {
        return 0;
    }
    let code = (scaled as u32) >> RESERVED_BITS;
    code.min(u32::from(SAMPLE_MAX)) as u16
}

/// Left-justify a code into its 16-bit register form (low 2 bits zero)
#[inline]
#[must_use]
pub const fn to_container(q: u16) -> u16 {
    q << RESERVED_BITS
}

/// Recover a code from its 16-bit register form
#[inline]
#[must_use]
pub const fn from_container(raw: u16) -> u16 {
    raw >> RESERVED_BITS
}

/// Approximate physical value of a code (lower edge of its bucket)
#[inline]
#[must_use]
pub fn dequantize(q: u16) -> f64 {
    f64::from(to_container(q)) / FULL_SCALE * SENSOR_SPAN - SENSOR_OFFSET
}

/// Drop fault readings and quantize the rest, preserving order
pub fn quantize_all<I>(raw: I) -> Vec<u16>
where
    I: IntoIterator<Item = f64>,
{
    raw.into_iter().filter(|&v| is_valid(v)).map(quantize).collect()
}
