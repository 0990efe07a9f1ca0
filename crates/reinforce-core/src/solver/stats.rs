use serde::{Deserialize, Serialize};

/// Per-state record of a value table.
///
/// Sampling estimators fill it through `record`; dynamic programming writes the
/// value directly with `set_value` and leaves the return statistics untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStats {
    value_sum: f64,
    visits: u64,
    value: f64,
}

impl StateStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a record from its persisted fields without recomputing anything.
    pub fn from_parts(value_sum: f64, visits: u64, value: f64) -> Self {
        StateStats {
            value_sum,
            visits,
            value,
        }
    }

    /// Cumulative return observed for the state.
    pub fn value_sum(&self) -> f64 {
        self.value_sum
    }

    /// How many returns were recorded.
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Current value estimate.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Overwrite the estimate.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Add one observed return and refresh the running average.
    pub fn record(&mut self, sample_return: f64) {
        self.visits += 1;
        self.value_sum += sample_return;
        self.value = self.value_sum / self.visits as f64;
    }

    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }
}
