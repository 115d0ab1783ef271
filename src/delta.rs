//! Delta transform: `previous - current` against an implicit leading zero.
//!
//! Arithmetic wraps, so [`decode`] inverts [`encode`] for every `i32` sequence,
//! including the second ("double delta") pass over an already delta-encoded stream.

/// Replace each element with `previous - current` (previous of the first is 0)
#[must_use]
pub fn encode(values: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev = 0i32;
    for &v in values {
        out.push(prev.wrapping_sub(v));
        prev = v;
    }
    out
}

/// Undo [`encode`]: `s[i] = s[i-1] - d[i]` with `s[-1] = 0`
#[must_use]
pub fn decode(deltas: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(deltas.len());
    let mut prev = 0i32;
    for &d in deltas {
        prev = prev.wrapping_sub(d);
        out.push(prev);
    }
    out
}

/// Widen quantized codes to the signed domain the transforms work in
#[must_use]
pub fn widen(samples: &[u16]) -> Vec<i32> {
    samples.iter().map(|&q| i32::from(q)).collect()
}
