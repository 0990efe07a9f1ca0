use crate::solver::{
    config::{SolverConfig, SweepMode},
    ids::ActionId,
    model::Kernel,
    solution::SolveReport,
};

/// How a state's new value is formed from its action values.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Backup<'a> {
    /// `max_a Q(s, a)`.
    Optimal,
    /// `sum_a pi(a|s) * Q(s, a)`, weights indexed by state.
    Policy(&'a [Vec<(ActionId, f64)>]),
}

impl Backup<'_> {
    fn value(&self, kernel: &Kernel, idx: usize, values: &[f64], gamma: f64) -> f64 {
        match self {
            Backup::Optimal => kernel.greedy(idx, values, gamma).map_or(0.0, |(_, q)| q),
            Backup::Policy(weights) => weights[idx]
                .iter()
                .map(|(action, prob)| prob * kernel.action_value(idx, *action, values, gamma))
                .sum(),
        }
    }
}

/// One pass over every non-terminal state. Returns the largest absolute change.
pub(crate) fn sweep(
    kernel: &Kernel,
    values: &mut [f64],
    gamma: f64,
    mode: SweepMode,
    backup: Backup<'_>,
) -> f64 {
    match mode {
        SweepMode::InPlace => {
            let mut delta = 0.0_f64;
            for idx in 0..kernel.len() {
                if kernel.is_terminal(idx) {
                    continue;
                }
                let updated = backup.value(kernel, idx, values, gamma);
                delta = delta.max((updated - values[idx]).abs());
                values[idx] = updated;
            }
            delta
        }
        SweepMode::Synchronous => {
            let updated: Vec<f64> = (0..kernel.len())
                .map(|idx| updated_value(kernel, idx, values, gamma, backup))
                .collect();
            commit(values, &updated)
        }
        SweepMode::Parallel => {
            let updated = parallel_update(kernel, values, gamma, backup);
            commit(values, &updated)
        }
    }
}

/// Sweep until the largest change drops below the tolerance or the sweep cap
/// is reached. Returns whether the tolerance was met.
pub(crate) fn sweep_until_stable(
    kernel: &Kernel,
    values: &mut [f64],
    config: &SolverConfig,
    backup: Backup<'_>,
    report: &mut SolveReport,
) -> bool {
    for _ in 0..config.max_sweeps {
        let delta = sweep(kernel, values, config.gamma, config.sweep, backup);
        report.record_sweep(delta);
        log::debug!("sweep {:>5} delta {:.3e}", report.sweeps, delta);
        if delta < config.tolerance {
            return true;
        }
    }
    false
}

fn updated_value(
    kernel: &Kernel,
    idx: usize,
    values: &[f64],
    gamma: f64,
    backup: Backup<'_>,
) -> f64 {
    if kernel.is_terminal(idx) {
        0.0
    } else {
        backup.value(kernel, idx, values, gamma)
    }
}

fn commit(values: &mut [f64], updated: &[f64]) -> f64 {
    let delta = values
        .iter()
        .zip(updated)
        .map(|(old, new)| (new - old).abs())
        .fold(0.0, f64::max);
    values.copy_from_slice(updated);
    delta
}

#[cfg(feature = "parallel")]
fn parallel_update(kernel: &Kernel, values: &[f64], gamma: f64, backup: Backup<'_>) -> Vec<f64> {
    use rayon::iter::IntoParallelIterator;
    use rayon::iter::ParallelIterator;
    (0..kernel.len())
        .into_par_iter()
        .map(|idx| updated_value(kernel, idx, values, gamma, backup))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn parallel_update(kernel: &Kernel, values: &[f64], gamma: f64, backup: Backup<'_>) -> Vec<f64> {
    (0..kernel.len())
        .map(|idx| updated_value(kernel, idx, values, gamma, backup))
        .collect()
}
