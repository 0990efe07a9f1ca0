mod solver;

pub use solver::config::{SolverConfig, SolverConfigError, SweepMode};
pub use solver::contract::{Action, Fmdp, Response, State, stable_key};
pub use solver::episode::{Agent, Episodic, Step};
pub use solver::error::{Distribution, SolverError};
pub use solver::ids::{ActionId, AgentId, StateKey};
#[cfg(feature = "parallel")]
pub use solver::monte_carlo::monte_carlo_predict_parallel;
pub use solver::monte_carlo::{FirstVisit, monte_carlo_predict};
pub use solver::policy::{GreedyPolicy, LookupPolicy, Policy, RandomPolicy};
pub use solver::policy_iteration::{evaluate_policy, improve_policy, policy_iteration};
pub use solver::snapshot::{EntrySnapshot, TableSnapshot};
pub use solver::solution::{Evaluation, SolveReport, Solution};
pub use solver::stats::StateStats;
pub use solver::table::{TableError, ValueTable};
pub use solver::value_iteration::value_iteration;
