use crate::solver::{
    config::SolverConfig,
    contract::{Action, Fmdp, State},
    error::SolverError,
    ids::ActionId,
    model::Model,
    policy::LookupPolicy,
    solution::{SolveReport, Solution},
    sweep::{Backup, sweep_until_stable},
};

/// Find an optimal policy by value iteration.
///
/// Every sweep sets `V(s) = max_a Q(s, a)` for each non-terminal state until the
/// largest change is below `config.tolerance` or `config.max_sweeps` sweeps ran.
/// Terminal states stay at 0. The returned policy is greedy with respect to the
/// final values, breaking ties by the lowest action index.
pub fn value_iteration<F: Fmdp>(
    fmdp: &F,
    config: &SolverConfig,
) -> Result<Solution<F::A>, SolverError> {
    config.check()?;
    let model = Model::build(fmdp, config)?;
    log::info!("value iteration over {} states (gamma {})", model.len(), config.gamma);

    let mut values = vec![0.0; model.len()];
    let mut report = SolveReport::new();
    let converged =
        sweep_until_stable(&model.kernel, &mut values, config, Backup::Optimal, &mut report);
    report.converged = converged;

    if report.converged {
        log::info!("value iteration converged after {} sweeps", report.sweeps);
    } else {
        log::warn!(
            "value iteration stopped at the {} sweep cap with delta {:.3e}",
            config.max_sweeps,
            report.final_delta
        );
    }

    let (policy, _) = greedy_policy(&model, &values, config.gamma);
    Ok(Solution {
        policy,
        values: model.table_from(&values),
        report,
    })
}

/// One-hot greedy policy over dense values, plus the chosen index per state.
/// Terminal states keep their first listed action, normally the null action.
pub(crate) fn greedy_policy<S, A>(
    model: &Model<S, A>,
    values: &[f64],
    gamma: f64,
) -> (LookupPolicy<A>, Vec<Option<ActionId>>)
where
    S: State,
    A: Action,
{
    let mut policy = LookupPolicy::new(gamma);
    let mut choices = Vec::with_capacity(model.len());

    for idx in 0..model.len() {
        let choice = if model.kernel.is_terminal(idx) {
            (!model.actions(idx).is_empty()).then(|| ActionId::from(0))
        } else {
            model
                .kernel
                .greedy(idx, values, gamma)
                .map(|(action, _)| action)
        };

        if let Some(action) = choice {
            log::trace!("greedy {} -> {:?}", model.key(idx), model.actions(idx)[action.index()]);
            policy.set_action(model.key(idx).clone(), model.actions(idx)[action.index()].clone());
        }
        choices.push(choice);
    }

    (policy, choices)
}
