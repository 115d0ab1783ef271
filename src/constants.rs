//! Codec limits and fixed-point parameters shared across deltarun modules.

use std::num::NonZeroU8;

/// Lowest raw reading forwarded to the quantizer; anything below is a fault marker
pub const VALID_MIN: f64 = -100.0;

/// Highest raw reading forwarded to the quantizer; anything above is a fault marker
pub const VALID_MAX: f64 = 100.0;

/// Physical value mapped to code 0 (sensor range is [-40, 125])
pub const SENSOR_OFFSET: f64 = 40.0;

/// Width of the physical sensor range in its native unit
pub const SENSOR_SPAN: f64 = 165.0;

/// Full-scale register value before the reserved low bits are dropped
pub const FULL_SCALE: f64 = 65_536.0;

/// Number of reserved (always-zero) low bits in the 16-bit register
pub const RESERVED_BITS: u32 = 2;

/// Width of a quantized sample
pub const SAMPLE_BITS: u32 = 16 - RESERVED_BITS;

/// Largest representable quantized sample (2^14 - 1)
pub const SAMPLE_MAX: u16 = (1 << SAMPLE_BITS) - 1;

/// Maximum run length of the direct pass (8-bit count field)
pub const DIRECT_MAX_RUN: NonZeroU8 = match NonZeroU8::new(255) {
    Some(n) => n,
    None => unreachable!(),
};

/// Maximum run length of the delta passes (2-bit count field, stored minus one)
pub const DELTA_MAX_RUN: NonZeroU8 = match NonZeroU8::new(4) {
    Some(n) => n,
    None => unreachable!(),
};

/// Bytes per sample in the quantized baseline (one 16-bit container)
pub const BASELINE_BYTES_PER_SAMPLE: usize = 2;

/// Bytes per record in the direct layout (count + 16-bit value)
pub const DIRECT_RECORD_BYTES: usize = 3;

// Packed record, first byte:
//   bit 7     continuation flag
//   bits 6-5  count - 1
//   bits 4-0  low five bits of the value (two's complement)
// With the flag set a second byte follows:
//   bit 7     continuation flag
//   bits 6-0  value bits 5-11
// With that flag set too a third byte carries value bits 12-15 in its low nibble.

/// Continuation flag of the first and second packed bytes
pub const PACKED_CONTINUATION: u8 = 0x80;

/// Shift of the 2-bit count field
pub const PACKED_COUNT_SHIFT: u32 = 5;

/// Mask of the 2-bit count field (after shifting)
pub const PACKED_COUNT_MASK: u8 = 0x03;

/// Mask of the 5-bit inline value field
pub const PACKED_LOW_MASK: u8 = 0x1F;

/// Bits carried inline in the first byte
pub const PACKED_LOW_BITS: u32 = 5;

/// Mask of the 7 value bits in the second byte
pub const PACKED_MID_MASK: u8 = 0x7F;

/// Value bits carried by the second byte
pub const PACKED_MID_BITS: u32 = 7;

/// Mask of the 4 value bits in the third byte; the high nibble must be zero
pub const PACKED_HIGH_MASK: u8 = 0x0F;

/// Value width of a two-byte record
pub const PACKED_ESCAPE_BITS: u32 = PACKED_LOW_BITS + PACKED_MID_BITS;

/// Maximum payload width of a packed record (three bytes)
pub const PACKED_PAYLOAD_BITS: u32 = 16;

/// Smallest value that fits the 1-byte fast path
pub const PACKED_INLINE_MIN: i32 = -(1 << (PACKED_LOW_BITS - 1));

/// Largest value that fits the 1-byte fast path
pub const PACKED_INLINE_MAX: i32 = (1 << (PACKED_LOW_BITS - 1)) - 1;

/// Smallest value a two-byte record can carry
pub const PACKED_ESCAPE_MIN: i32 = -(1 << (PACKED_ESCAPE_BITS - 1));

/// Largest value a two-byte record can carry
pub const PACKED_ESCAPE_MAX: i32 = (1 << (PACKED_ESCAPE_BITS - 1)) - 1;

/// Smallest value any packed record can carry
pub const PACKED_PAYLOAD_MIN: i32 = -(1 << (PACKED_PAYLOAD_BITS - 1));

/// Largest value any packed record can carry
pub const PACKED_PAYLOAD_MAX: i32 = (1 << (PACKED_PAYLOAD_BITS - 1)) - 1;

/// Sign-extend the low `bits` bits of `raw` to an i32
#[inline]
pub(crate) const fn sign_extend(raw: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((raw << shift) as i32) >> shift
}
