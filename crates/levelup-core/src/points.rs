//! Running point total for a user.
//!
//! Two distinct entry points: [`award_points`] is the normal, monotonic path;
//! [`reset_points`] overwrites the total and may lower it (guest data reset).

use serde::{Deserialize, Serialize};

/// Add `delta` to `current`. There is no upper cap; the sum saturates at
/// `u64::MAX` instead of wrapping.
pub fn award_points(current: u64, delta: u64) -> u64 {
    current.saturating_add(delta)
}

/// Unconditional overwrite of the total.
pub fn reset_points(value: u64) -> u64 {
    value
}

/// Outcome of an overwrite, used to flag regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsReset {
    pub previous: u64,
    pub current: u64,
}

impl PointsReset {
    pub fn new(previous: u64, value: u64) -> Self {
        Self {
            previous,
            current: reset_points(value),
        }
    }

    /// True when the overwrite lowered the total.
    pub fn is_regression(&self) -> bool {
        self.current < self.previous
    }
}
