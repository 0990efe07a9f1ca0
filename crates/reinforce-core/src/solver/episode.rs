use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::solver::{
    config::SolverConfig,
    contract::{Fmdp, State, check_distribution, stable_key},
    error::{Distribution, SolverError},
    policy::Policy,
};

/// One time step of an episode: the state, the action taken from it, and the
/// reward received for that action.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
}

/// Something that can play complete episodes of an FMDP and report them.
pub trait Episodic {
    type S: State;
    type A;

    /// Return to the initial state, clear the history and move on to the next episode.
    fn reset(&mut self);

    /// Play from the initial state until a terminal state is reached.
    fn run(&mut self) -> Result<(), SolverError>;

    /// Steps of the last episode, earliest first. The terminal state has no step.
    fn history(&self) -> &[Step<Self::S, Self::A>];
}

/// A policy bound to an FMDP, sampling actions and responses from a seeded stream.
///
/// Episode `k` always draws from random stream `k` of the configured seed, so an
/// episode is reproducible whatever order episodes are played in.
#[derive(Debug)]
pub struct Agent<'a, F: Fmdp, P> {
    fmdp: &'a F,
    policy: P,
    seed: u64,
    episode: u64,
    max_steps: usize,
    prob_tolerance: f64,
    rng: ChaCha8Rng,
    history: Vec<Step<F::S, F::A>>,
}

impl<'a, F, P> Agent<'a, F, P>
where
    F: Fmdp,
    P: Policy<F>,
{
    /// Create an agent ready to play episode 0.
    pub fn new(fmdp: &'a F, policy: P, config: &SolverConfig) -> Self {
        Self::at_episode(fmdp, policy, config, 0)
    }

    /// Create an agent ready to play episode `episode`.
    pub fn at_episode(fmdp: &'a F, policy: P, config: &SolverConfig, episode: u64) -> Self {
        let mut agent = Agent {
            fmdp,
            policy,
            seed: config.seed,
            episode,
            max_steps: config.max_episode_steps,
            prob_tolerance: config.prob_tolerance,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            history: Vec::new(),
        };
        agent.reset();
        agent
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Take the history of the last episode, leaving it empty.
    pub fn take_history(&mut self) -> Vec<Step<F::S, F::A>> {
        std::mem::take(&mut self.history)
    }

    fn uniform(&mut self) -> f64 {
        (self.rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0)
    }

    fn choose(&mut self, state: &F::S) -> Result<F::A, SolverError> {
        let distribution = self.policy.distribution(self.fmdp, state)?;
        check_distribution(
            &stable_key(state)?,
            || Distribution::Policy,
            distribution.iter().map(|(_, prob)| *prob),
            self.prob_tolerance,
        )?;

        let sample = self.uniform();
        let last = distribution.len().saturating_sub(1);
        let mut cumulative = 0.0_f64;
        for (idx, (action, prob)) in distribution.into_iter().enumerate() {
            cumulative += prob;
            if sample < cumulative || idx == last {
                return Ok(action);
            }
        }
        Err(SolverError::MissingActions {
            state: stable_key(state)?,
        })
    }
}

impl<F, P> Episodic for Agent<'_, F, P>
where
    F: Fmdp,
    P: Policy<F>,
{
    type S = F::S;
    type A = F::A;

    fn reset(&mut self) {
        self.history.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.rng.set_stream(self.episode);
        self.episode += 1;
    }

    fn run(&mut self) -> Result<(), SolverError> {
        let mut state = self.fmdp.initial();

        for _ in 0..self.max_steps {
            if state.is_terminal() {
                return Ok(());
            }

            let action = self.choose(&state)?;
            let sample = self.uniform();
            let response = self
                .fmdp
                .sample(&state, &action, sample)
                .ok_or_else(|| SolverError::MalformedDistribution {
                    state: state.key(),
                    distribution: Distribution::Responses {
                        action: format!("{action:?}"),
                    },
                    sum: 0.0,
                })?;

            self.history.push(Step {
                state,
                action,
                reward: response.reward,
            });
            state = response.next;
        }

        if state.is_terminal() {
            Ok(())
        } else {
            Err(SolverError::EpisodeLimit {
                steps: self.max_steps,
            })
        }
    }

    fn history(&self) -> &[Step<F::S, F::A>] {
        &self.history
    }
}
