use std::path::PathBuf;

use reinforce_core::{
    RandomPolicy, SolverConfig, monte_carlo_predict, policy_iteration, value_iteration,
};
use reinforce_mdp::compile_yaml_for;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/reinforce-mdp/examples/sample.mdp.yaml"));
    let config = match args.next() {
        Some(config_path) => {
            SolverConfig::from_yaml_path(config_path).expect("failed to load solver config")
        }
        None => SolverConfig::from_default_yaml().expect("bundled solver config is valid"),
    };

    let mdp = compile_yaml_for(&path, &config).expect("failed to compile MDP YAML");

    let solution = value_iteration(&mdp, &config).expect("value iteration failed");
    println!(
        "value iteration: sweeps={} converged={}",
        solution.report.sweeps, solution.report.converged
    );
    for (state, actions) in solution.policy.iter() {
        let best = solution.policy.action(state).map_or("-", |action| action.id());
        println!(
            "  {state}: value={:.6} action={best} ({} listed)",
            solution.values.value(state),
            actions.len()
        );
    }

    let improved = policy_iteration(&mdp, &config).expect("policy iteration failed");
    println!(
        "policy iteration: rounds={} agrees={}",
        improved.report.improvements,
        improved.policy == solution.policy
    );

    let estimate = monte_carlo_predict(&mdp, RandomPolicy::new(config.gamma), &config)
        .expect("monte carlo prediction failed");
    println!(
        "random policy, first-visit estimate over {} episodes:",
        config.max_episodes
    );
    print!("{}", estimate.to_json().expect("table serializes"));
    println!();
}
