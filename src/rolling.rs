//! Causal moving averages over per-sentence series.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// A validated, positive window size.
///
/// Built from untrusted input with `TryFrom<i64>`; non-positive values are
/// rejected rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "usize")]
pub struct RollingWindow(usize);

impl RollingWindow {
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<i64> for RollingWindow {
    type Error = MetricsError;

    fn try_from(value: i64) -> Result<Self> {
        if value <= 0 {
            return Err(MetricsError::InvalidWindow {
                name: "rolling window",
                value,
            });
        }
        Ok(Self(value as usize))
    }
}

impl From<RollingWindow> for usize {
    fn from(w: RollingWindow) -> usize {
        w.0
    }
}

/// Mean of the last `min(window, i + 1)` values at every position `i`.
///
/// Left-padded, not centred. `window <= 1` returns the input unchanged. Runs
/// in linear time: a running sum over a bounded queue.
pub fn rolling(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity(values.len());
    let mut queue: VecDeque<f64> = VecDeque::with_capacity(window + 1);
    let mut sum = 0.0;
    for &v in values {
        queue.push_back(v);
        sum += v;
        if queue.len() > window {
            if let Some(old) = queue.pop_front() {
                sum -= old;
            }
        }
        out.push(sum / queue.len() as f64);
    }
    out
}
