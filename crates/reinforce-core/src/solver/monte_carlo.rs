use std::collections::HashMap;

use crate::solver::{
    config::SolverConfig,
    contract::{Fmdp, State, stable_key},
    episode::{Agent, Episodic, Step},
    error::SolverError,
    ids::StateKey,
    policy::Policy,
    table::ValueTable,
};

/// Episodes between progress log lines.
const LOG_EVERY: usize = 1000;

/// First-visit Monte Carlo accumulator.
///
/// Every observed episode adds, for each state, the discounted return following
/// the earliest step at which that state occurs. Later occurrences of an equal
/// state (same canonical key) in the same episode contribute nothing.
#[derive(Debug, Clone)]
pub struct FirstVisit {
    gamma: f64,
    episodes: usize,
    table: ValueTable,
}

impl FirstVisit {
    pub fn new(gamma: f64) -> Self {
        FirstVisit {
            gamma,
            episodes: 0,
            table: ValueTable::new(),
        }
    }

    /// Number of episodes observed so far.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn into_table(self) -> ValueTable {
        self.table
    }

    /// Fold one complete episode into the statistics.
    pub fn observe<S: State, A>(&mut self, history: &[Step<S, A>]) -> Result<(), SolverError> {
        let keys = history
            .iter()
            .map(|step| stable_key(&step.state))
            .collect::<Result<Vec<_>, _>>()?;

        let mut first_visit: HashMap<&StateKey, usize> = HashMap::with_capacity(keys.len());
        for (t, key) in keys.iter().enumerate() {
            first_visit.entry(key).or_insert(t);
        }

        let mut g = 0.0_f64;
        for t in (0..history.len()).rev() {
            g = g * self.gamma + history[t].reward;
            if first_visit.get(&keys[t]) == Some(&t) {
                self.table.record(keys[t].clone(), g);
            }
        }

        self.episodes += 1;
        Ok(())
    }

    /// Play and observe episodes until `episodes` episodes were folded in.
    pub fn predict<E: Episodic>(
        &mut self,
        agent: &mut E,
        episodes: usize,
    ) -> Result<(), SolverError> {
        for _ in 0..episodes {
            agent.run()?;
            self.observe(agent.history())?;
            agent.reset();

            if self.episodes.is_multiple_of(LOG_EVERY) {
                log::debug!(
                    "observed {} episodes, {} states valued",
                    self.episodes,
                    self.table.len()
                );
            }
        }
        Ok(())
    }
}

/// Estimate the state values of `policy` by first-visit Monte Carlo prediction.
///
/// Plays exactly `config.max_episodes` episodes with returns discounted by
/// `config.gamma`. States never visited read as 0 in the returned table.
pub fn monte_carlo_predict<F, P>(
    fmdp: &F,
    policy: P,
    config: &SolverConfig,
) -> Result<ValueTable, SolverError>
where
    F: Fmdp,
    P: Policy<F>,
{
    config.check()?;
    log::info!(
        "monte carlo prediction over {} episodes (gamma {}, seed {})",
        config.max_episodes,
        config.gamma,
        config.seed
    );

    let mut agent = Agent::new(fmdp, policy, config);
    let mut predictor = FirstVisit::new(config.gamma);
    predictor.predict(&mut agent, config.max_episodes)?;

    log::info!("monte carlo prediction valued {} states", predictor.table().len());
    Ok(predictor.into_table())
}

/// Episodes generated per parallel batch before folding.
#[cfg(feature = "parallel")]
const PARALLEL_BATCH: usize = 256;

/// `monte_carlo_predict` with episodes generated on the rayon pool.
///
/// Each batch of episodes is played in parallel and folded into the table in
/// episode order, so the result is identical to the sequential predictor.
#[cfg(feature = "parallel")]
pub fn monte_carlo_predict_parallel<F, P>(
    fmdp: &F,
    policy: &P,
    config: &SolverConfig,
) -> Result<ValueTable, SolverError>
where
    F: Fmdp + Sync,
    F::S: Send,
    F::A: Send,
    P: Policy<F> + Sync,
{
    use rayon::iter::IntoParallelIterator;
    use rayon::iter::ParallelIterator;

    config.check()?;
    log::info!(
        "parallel monte carlo prediction over {} episodes on {} threads",
        config.max_episodes,
        rayon::current_num_threads()
    );

    let mut predictor = FirstVisit::new(config.gamma);
    let mut start = 0;
    while start < config.max_episodes {
        let end = (start + PARALLEL_BATCH).min(config.max_episodes);
        let batch = (start..end)
            .into_par_iter()
            .map(|episode| -> Result<Vec<Step<F::S, F::A>>, SolverError> {
                let mut agent = Agent::at_episode(fmdp, policy, config, episode as u64);
                agent.run()?;
                Ok(agent.take_history())
            })
            .collect::<Vec<_>>();

        for history in batch {
            predictor.observe(&history?)?;
        }
        log::debug!(
            "observed {} episodes, {} states valued",
            predictor.episodes(),
            predictor.table().len()
        );
        start = end;
    }

    Ok(predictor.into_table())
}
