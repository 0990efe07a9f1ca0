use reinforce_core::{
    Action, AgentId, Fmdp, RandomPolicy, Response, SolverConfig, State, StateKey, SweepMode,
    evaluate_policy, monte_carlo_predict, policy_iteration, value_iteration,
};

/// 4x4 grid, cells numbered row by row. Cells 0 and 15 end the episode and
/// every move costs 1. Moves off the grid leave the agent where it is.
struct Gridworld;

#[derive(Debug, Clone, PartialEq)]
struct Cell(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
    Null,
}

impl State for Cell {
    fn key(&self) -> StateKey {
        StateKey::from(self.0 as u64)
    }

    fn is_terminal(&self) -> bool {
        self.0 == 0 || self.0 == 15
    }
}

impl Action for Dir {
    fn agent(&self) -> AgentId {
        AgentId::from(0)
    }

    fn is_null(&self) -> bool {
        *self == Dir::Null
    }
}

impl Fmdp for Gridworld {
    type S = Cell;
    type A = Dir;

    fn states(&self) -> Option<Vec<Cell>> {
        Some((0..16).map(Cell).collect())
    }

    fn initial(&self) -> Cell {
        Cell(6)
    }

    fn actions(&self, state: &Cell) -> Vec<Dir> {
        if state.is_terminal() {
            vec![Dir::Null]
        } else {
            vec![Dir::Up, Dir::Down, Dir::Left, Dir::Right]
        }
    }

    fn responses(&self, state: &Cell, action: &Dir) -> Vec<Response<Cell>> {
        let (row, col) = (state.0 / 4, state.0 % 4);
        let next = match action {
            Dir::Up if row > 0 => state.0 - 4,
            Dir::Down if row < 3 => state.0 + 4,
            Dir::Left if col > 0 => state.0 - 1,
            Dir::Right if col < 3 => state.0 + 1,
            Dir::Null => return vec![Response::new(state.clone(), 0.0, 1.0)],
            _ => state.0,
        };
        vec![Response::new(Cell(next), -1.0, 1.0)]
    }
}

const EQUIPROBABLE: [f64; 16] = [
    0.0, -14.0, -20.0, -22.0, //
    -14.0, -18.0, -20.0, -20.0, //
    -20.0, -20.0, -18.0, -14.0, //
    -22.0, -20.0, -14.0, 0.0,
];

fn cell(idx: usize) -> StateKey {
    StateKey::from(idx as u64)
}

fn optimal(idx: usize) -> f64 {
    let (row, col) = (idx / 4, idx % 4);
    let to_start = row + col;
    let to_end = (3 - row) + (3 - col);
    -(to_start.min(to_end) as f64)
}

fn tight() -> SolverConfig {
    SolverConfig {
        tolerance: 1e-9,
        max_sweeps: 10_000,
        ..SolverConfig::default()
    }
}

#[test]
fn equiprobable_policy_values_match_the_textbook_grid() {
    let _ = env_logger::builder().is_test(true).try_init();

    let evaluation =
        evaluate_policy(&Gridworld, &RandomPolicy::new(1.0), &tight()).expect("evaluation");
    assert!(evaluation.report.converged);

    for (idx, expected) in EQUIPROBABLE.iter().enumerate() {
        let got = evaluation.values.value(&cell(idx));
        assert!((got - expected).abs() < 1e-4, "cell {idx}: expected {expected}, got {got}");
    }
}

#[test]
fn synchronous_evaluation_agrees_with_in_place() {
    let synchronous = SolverConfig {
        sweep: SweepMode::Synchronous,
        ..tight()
    };
    let jacobi =
        evaluate_policy(&Gridworld, &RandomPolicy::new(1.0), &synchronous).expect("synchronous");
    let gauss_seidel =
        evaluate_policy(&Gridworld, &RandomPolicy::new(1.0), &tight()).expect("in place");

    assert!(jacobi.values.max_abs_diff(&gauss_seidel.values) < 1e-4);
}

#[test]
fn value_iteration_finds_shortest_paths() {
    let solution = value_iteration(&Gridworld, &SolverConfig::default()).expect("solve");
    assert!(solution.report.converged);

    for idx in 0..16 {
        assert_eq!(solution.values.value(&cell(idx)), optimal(idx), "cell {idx}");
    }
    assert_eq!(solution.policy.action(&cell(1)), Some(&Dir::Left));
    assert_eq!(solution.policy.action(&cell(4)), Some(&Dir::Up));
    assert_eq!(solution.policy.action(&cell(14)), Some(&Dir::Right));
    assert_eq!(solution.policy.action(&cell(15)), Some(&Dir::Null));
}

#[test]
fn policy_iteration_matches_value_iteration_on_the_grid() {
    // The initial all-Up policy never ends from the top row, so discount it.
    let discounted = SolverConfig {
        gamma: 0.9,
        ..SolverConfig::default()
    };
    let by_value = value_iteration(&Gridworld, &discounted).expect("value iteration");
    let by_policy = policy_iteration(&Gridworld, &discounted).expect("policy iteration");

    assert!(by_policy.report.converged);
    assert_eq!(by_policy.policy, by_value.policy);
    assert!(by_policy.values.max_abs_diff(&by_value.values) < 1e-9);
}

#[test]
fn monte_carlo_tracks_the_equiprobable_values() {
    let config = SolverConfig {
        max_episodes: 5000,
        seed: 11,
        ..SolverConfig::default()
    };
    let estimate =
        monte_carlo_predict(&Gridworld, RandomPolicy::new(1.0), &config).expect("estimate");

    // Every episode starts in cell 6 so that state is visited each time.
    let start = estimate.get(&cell(6)).expect("start visited");
    assert_eq!(start.visits(), 5000);
    assert!((start.value() - EQUIPROBABLE[6]).abs() < 1.5, "got {}", start.value());
}
