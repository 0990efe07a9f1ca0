use crate::solver::{
    config::SolverConfig,
    contract::{Fmdp, check_distribution},
    error::{Distribution, SolverError},
    ids::ActionId,
    model::{Kernel, Model},
    policy::{LookupPolicy, Policy},
    solution::{Evaluation, SolveReport, Solution},
    sweep::{Backup, sweep_until_stable},
    table::ValueTable,
    value_iteration::greedy_policy,
};

/// Find an optimal policy by alternating evaluation and greedy improvement.
///
/// Starts from the policy that picks every state's first listed action. Each
/// round evaluates the current deterministic policy (warm-started from the
/// previous values), then rebuilds it greedily with the lowest-index tie-break.
/// Stops once no state changes its action or `config.max_improvements` rounds ran.
pub fn policy_iteration<F: Fmdp>(
    fmdp: &F,
    config: &SolverConfig,
) -> Result<Solution<F::A>, SolverError> {
    config.check()?;
    let model = Model::build(fmdp, config)?;
    log::info!("policy iteration over {} states (gamma {})", model.len(), config.gamma);

    let mut choices: Vec<Option<ActionId>> = (0..model.len())
        .map(|idx| (!model.actions(idx).is_empty()).then(|| ActionId::from(0)))
        .collect();
    let mut values = vec![0.0; model.len()];
    let mut report = SolveReport::new();
    let mut stable = false;
    let mut evaluated = false;
    let mut policy = LookupPolicy::new(config.gamma);

    for round in 1..=config.max_improvements {
        report.improvements = round;
        let weights = one_hot_weights(&model.kernel, &choices);
        evaluated = sweep_until_stable(
            &model.kernel,
            &mut values,
            config,
            Backup::Policy(&weights),
            &mut report,
        );
        if !evaluated {
            log::warn!(
                "evaluation in round {round} stopped at the {} sweep cap",
                config.max_sweeps
            );
        }

        let (improved, improved_choices) = greedy_policy(&model, &values, config.gamma);
        let changed = choices
            .iter()
            .zip(&improved_choices)
            .filter(|(old, new)| old != new)
            .count();
        log::debug!("improvement round {round}: {changed} states changed action");

        policy = improved;
        choices = improved_choices;
        if changed == 0 {
            stable = true;
            break;
        }
    }

    report.converged = stable && evaluated;
    if report.converged {
        log::info!(
            "policy iteration stable after {} rounds, {} sweeps",
            report.improvements,
            report.sweeps
        );
    } else {
        log::warn!(
            "policy iteration stopped after {} rounds without a stable, fully evaluated policy",
            report.improvements
        );
    }

    Ok(Solution {
        policy,
        values: model.table_from(&values),
        report,
    })
}

/// Iterative policy evaluation: sweep `V(s) = sum_a pi(a|s) * Q(s, a)` until the
/// largest change is below `config.tolerance` or the sweep cap is reached.
///
/// Uses the policy's own discount factor in place of `config.gamma`.
pub fn evaluate_policy<F, P>(
    fmdp: &F,
    policy: &P,
    config: &SolverConfig,
) -> Result<Evaluation, SolverError>
where
    F: Fmdp,
    P: Policy<F> + ?Sized,
{
    let config = SolverConfig {
        gamma: policy.discount(),
        ..config.clone()
    };
    config.check()?;
    let model = Model::build(fmdp, &config)?;
    log::info!("evaluating policy over {} states (gamma {})", model.len(), config.gamma);

    let mut weights = Vec::with_capacity(model.len());
    for idx in 0..model.len() {
        if model.kernel.is_terminal(idx) {
            weights.push(Vec::new());
            continue;
        }

        let key = model.key(idx);
        let distribution = policy.distribution(fmdp, model.state(idx))?;
        check_distribution(
            key,
            || Distribution::Policy,
            distribution.iter().map(|(_, prob)| *prob),
            config.prob_tolerance,
        )?;

        let mut state_weights = Vec::with_capacity(distribution.len());
        for (action, prob) in distribution {
            let action_id = model
                .action_id(idx, &action)
                .ok_or_else(|| SolverError::UnknownAction {
                    state: key.clone(),
                    action: format!("{action:?}"),
                })?;
            state_weights.push((action_id, prob));
        }
        weights.push(state_weights);
    }

    let mut values = vec![0.0; model.len()];
    let mut report = SolveReport::new();
    let converged = sweep_until_stable(
        &model.kernel,
        &mut values,
        &config,
        Backup::Policy(&weights),
        &mut report,
    );
    report.converged = converged;
    if !converged {
        log::warn!(
            "policy evaluation stopped at the {} sweep cap with delta {:.3e}",
            config.max_sweeps,
            report.final_delta
        );
    }

    Ok(Evaluation {
        values: model.table_from(&values),
        report,
    })
}

/// Greedy one-step improvement: the deterministic policy choosing, in every state,
/// the action with the highest `Q(s, a)` under `values` (lowest index on ties).
pub fn improve_policy<F: Fmdp>(
    fmdp: &F,
    values: &ValueTable,
    config: &SolverConfig,
) -> Result<LookupPolicy<F::A>, SolverError> {
    config.check()?;
    let model = Model::build(fmdp, config)?;
    let dense = model.values_from(values);
    let (policy, _) = greedy_policy(&model, &dense, config.gamma);
    Ok(policy)
}

fn one_hot_weights(kernel: &Kernel, choices: &[Option<ActionId>]) -> Vec<Vec<(ActionId, f64)>> {
    choices
        .iter()
        .enumerate()
        .map(|(idx, choice)| match choice {
            Some(action) if !kernel.is_terminal(idx) => vec![(*action, 1.0)],
            _ => Vec::new(),
        })
        .collect()
}
