//! Time-indexed value history for votes and total supply.

use dao_types::Timestamp;
use serde::{Deserialize, Serialize};

/// The value of a tracked quantity from `at` until the next checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub at: Timestamp,
    pub value: u128,
}

/// Ordered checkpoint history. At most one checkpoint per timestamp.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Checkpoints {
    history: Vec<Checkpoint>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as of `at`.
    ///
    /// A write at (or before) the latest checkpoint's timestamp replaces that
    /// checkpoint's value, so the history stays strictly increasing in time.
    pub fn record(&mut self, at: Timestamp, value: u128) {
        match self.history.last_mut() {
            Some(last) if at <= last.at => last.value = value,
            _ => self.history.push(Checkpoint { at, value }),
        }
    }

    /// The current value (0 if nothing was ever recorded).
    pub fn latest(&self) -> u128 {
        self.history.last().map(|c| c.value).unwrap_or(0)
    }

    /// The value in effect at time `at`: the last checkpoint with `checkpoint.at <= at`.
    pub fn value_at(&self, at: Timestamp) -> u128 {
        let idx = self.history.partition_point(|c| c.at <= at);
        if idx == 0 {
            0
        } else {
            self.history[idx - 1].value
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
