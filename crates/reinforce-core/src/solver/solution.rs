use crate::solver::{policy::LookupPolicy, table::ValueTable};

/// Aggregate metrics of one solver run.
///
/// `converged == false` means a sweep or improvement cap ran out first; the
/// accompanying values and policy are the best estimate at that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Sweeps performed across every evaluation phase.
    pub sweeps: usize,
    /// Improvement rounds, 0 for value iteration and plain evaluation.
    pub improvements: usize,
    /// Largest value change of the last sweep.
    pub final_delta: f64,
    pub converged: bool,
}

impl SolveReport {
    pub(crate) fn new() -> Self {
        SolveReport {
            sweeps: 0,
            improvements: 0,
            final_delta: f64::INFINITY,
            converged: false,
        }
    }

    pub(crate) fn record_sweep(&mut self, delta: f64) {
        self.sweeps += 1;
        self.final_delta = delta;
    }
}

/// Output of value iteration and policy iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<A> {
    pub policy: LookupPolicy<A>,
    pub values: ValueTable,
    pub report: SolveReport,
}

/// Output of policy evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub values: ValueTable,
    pub report: SolveReport,
}
