//! Run-length codec with a per-pass maximum run length.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU8;

/// One run-length record: `count` consecutive copies of `value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Number of repetitions, always in `1..=max_run` of the pass that produced it
    pub count: u8,
    /// Repeated value
    pub value: i32,
}

impl Run {
    #[inline]
    #[must_use]
    pub const fn new(count: u8, value: i32) -> Self {
        Self { count, value }
    }
}

/// Collapse consecutive equal values into runs of at most `max_run`
///
/// A run that reaches `max_run` is flushed as `(max_run, value)` and the next
/// equal element starts a fresh run, so `max_run + 1` equal values always
/// produce exactly two records.
///
/// # Example
/// ```
/// use deltarun::rle::{encode, Run};
/// use std::num::NonZeroU8;
///
/// let runs = encode(&[7, 7, 7, 3], NonZeroU8::new(2).unwrap());
/// assert_eq!(runs, vec![Run::new(2, 7), Run::new(1, 7), Run::new(1, 3)]);
/// ```
#[must_use]
pub fn encode(values: &[i32], max_run: NonZeroU8) -> Vec<Run> {
    let max_run = max_run.get();
    let mut runs = Vec::new();
    let Some((&first, rest)) = values.split_first() else {
        return runs;
    };

    let mut current = Run::new(1, first);
    for &v in rest {
        if v == current.value && current.count < max_run {
            current.count += 1;
        } else {
            runs.push(current);
            current = Run::new(1, v);
        }
    }
    runs.push(current);
    runs
}

/// Expand runs back into the sequence they encode
#[must_use]
pub fn decode(runs: &[Run]) -> Vec<i32> {
    let total: usize = runs.iter().map(|r| usize::from(r.count)).sum();
    let mut out = Vec::with_capacity(total);
    for run in runs {
        out.extend(std::iter::repeat(run.value).take(usize::from(run.count)));
    }
    out
}
